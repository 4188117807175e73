//! Core library for the crm-translator command line application.
//!
//! The library synchronises the localized labels of a metadata catalog with
//! Excel workbooks in both directions. Workbook adapters live under
//! [`crm::translator::io`], the catalog data model inside
//! [`crm::translator::model`], the sheet layouts in [`crm::translator::codec`],
//! the per-kind translators in [`crm::translator::entity`] and
//! [`crm::translator::attribute`], batched store updates under
//! [`crm::translator::dispatch`], and the directory run loop under
//! [`crm::translator::sync`].

pub mod crm;

pub use crm::translator::{
    Result, TranslatorError, attribute, cache, codec, config, dispatch, engine, entity, error,
    filter, io, labels, model, outcome, settings, store, sync,
};
