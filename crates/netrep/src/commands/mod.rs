pub mod cleanup;
pub mod replication;
pub mod run;
pub mod snapshot;
pub mod status;
