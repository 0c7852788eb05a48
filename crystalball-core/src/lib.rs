//! CrystalBall Core: price series, data acquisition, indicators, rules and scoring.
//!
//! This crate contains the screening pipeline for a single ticker:
//! - Domain types (price bars, validated price series)
//! - Data provider trait, Yahoo Finance adapter, memo cache
//! - Sequential fetcher with linear retry backoff
//! - Trend EMAs and the MACD family (classic and volume-weighted)
//! - Rule predicates, scoring policies and status labels

pub mod data;
pub mod domain;
pub mod indicators;
pub mod rules;
