// ==============================================================================
// lib.rs - MPD Tools Library
// ==============================================================================
// Description: Library interface for the rare-disease variant analysis tools
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod annotate;
pub mod enrichment;
pub mod filters;
pub mod genotype;
pub mod gnomad;
pub mod go_counts;
pub mod inheritance;
pub mod manifest;
pub mod models;
pub mod output;
pub mod parsers;
pub mod probands;
pub mod processor;
pub mod validator;
pub mod vep;
