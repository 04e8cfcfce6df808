pub mod motus;
