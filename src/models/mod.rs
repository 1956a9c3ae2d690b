// src/models/mod.rs

pub mod attempt;
pub mod skill;
