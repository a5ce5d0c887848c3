pub mod draftkings;
pub mod pool_csv;
pub mod runs;
