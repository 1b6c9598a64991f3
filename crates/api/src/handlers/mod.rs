pub mod followups;
pub mod health;
pub mod leads;
pub mod metrics;
