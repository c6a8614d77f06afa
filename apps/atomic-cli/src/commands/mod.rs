// [apps/atomic-cli/src/commands/mod.rs]
pub mod bond;
pub mod fission;
pub mod mint;
pub mod price;
