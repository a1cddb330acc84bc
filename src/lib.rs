//! Board Master - weekly task quests for learners
//!
//! Tutors plan a Monday-to-Sunday cycle of recurring tasks, learners
//! complete them for points, boss tasks unlock at 80% progress, and the
//! tutor settles the week by approving or rejecting completions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
