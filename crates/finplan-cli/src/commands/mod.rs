pub mod credit;
pub mod mortgage;
pub mod savings;
