//! Seed-and-verify mining of phenotype-associated genes.
//!
//! A run expands a phenotype into MeSH synonyms, seeds candidate genes from
//! NCBI Gene, MedGen and GTR, confirms each candidate against PubMed
//! abstracts, and exports the collected state.

pub mod app;
pub mod config;
pub mod crosscheck;
pub mod domain;
pub mod entrez;
pub mod error;
pub mod export;
pub mod output;
pub mod records;
pub mod reference;
pub mod retrieval;
pub mod state;
pub mod verify;
pub mod vocabulary;
pub mod xml;
