pub mod parkrun;
