//! Multi-step operations spanning several tables and outbound calls

pub mod booking;
pub mod challenge;
pub mod checkout;
