//! FFI bindings for SDF Flux
//!
//! This module provides C-compatible functions for calling Flux from other languages.
//! Matrices, partitions and configs cross the boundary as JSON C strings.
//! Returned strings are allocated by Rust and must be freed by the caller using
//! `sdf_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::SdfConfig;
use crate::error::SdfError;
use crate::partition::{Partition, PartitionGenerator};
use crate::pipeline::SdfProcessor;
use crate::types::SampleMatrix;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Publish a result across the boundary, recording the error on failure
fn finish(result: Result<String, SdfError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Columns-as-series JSON (`[[f64]]`) into a sample matrix
fn parse_columns(json: &str) -> Result<SampleMatrix, SdfError> {
    let columns: Vec<Vec<f64>> = serde_json::from_str(json)?;
    SampleMatrix::from_columns(columns)
}

// ============================================================================
// Stateless API
// ============================================================================

/// Fit a maximum entropy partition and return it as JSON.
///
/// # Safety
/// - `columns_json` must be a valid null-terminated C string holding a JSON
///   array of series (`[[f64]]`).
/// - Returns a newly allocated string that must be freed with `sdf_free_string`.
/// - Returns NULL on error; call `sdf_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sdf_fit_partition(
    columns_json: *const c_char,
    num_symbols: u32,
) -> *mut c_char {
    clear_last_error();

    let columns_str = match cstr_to_string(columns_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid columns string pointer");
            return ptr::null_mut();
        }
    };

    finish(
        parse_columns(&columns_str)
            .and_then(|matrix| PartitionGenerator::fit_matrix(&matrix, num_symbols as usize))
            .and_then(|partition| partition.to_json()),
    )
}

/// Extract features and return a JSON feature report.
///
/// # Safety
/// - `columns_json` and `config_json` must be valid null-terminated C strings.
/// - `partition_json` may be NULL, in which case the partition is fitted on the
///   input columns themselves.
/// - Returns a newly allocated string that must be freed with `sdf_free_string`.
/// - Returns NULL on error; call `sdf_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sdf_extract(
    columns_json: *const c_char,
    partition_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let columns_str = match cstr_to_string(columns_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid columns string pointer");
            return ptr::null_mut();
        }
    };

    let config_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    let partition_str = cstr_to_string(partition_json);

    finish(extract_report_json(
        &columns_str,
        partition_str.as_deref(),
        &config_str,
    ))
}

fn extract_report_json(
    columns_json: &str,
    partition_json: Option<&str>,
    config_json: &str,
) -> Result<String, SdfError> {
    let config = SdfConfig::from_json(config_json)?;
    let matrix = parse_columns(columns_json)?;

    let processor = match partition_json {
        Some(json) => SdfProcessor::with_partition(config, Partition::from_json(json)?)?,
        None => {
            let mut processor = SdfProcessor::new(config)?;
            processor.fit(&matrix)?;
            processor
        }
    };

    let report = processor.extract_report(&matrix)?;
    Ok(serde_json::to_string(&report)?)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sdf_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Flux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sdf_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sdf_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
