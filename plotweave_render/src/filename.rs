// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Turns an arbitrary title into a file name that is valid on common
/// filesystems, with `extension` appended.
///
/// Path separators, reserved punctuation and control characters become `_`.
/// Leading and trailing dots and spaces are trimmed, and an empty result
/// falls back to `"plot"`.
pub fn make_safe_filename(title: &str, extension: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == ' ');
    let stem = if cleaned.is_empty() { "plot" } else { cleaned };
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        stem.to_owned()
    } else {
        format!("{stem}.{extension}")
    }
}
