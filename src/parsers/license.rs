//! License text recognition
//!
//! Header heuristics over the first part of a LICENSE/LICENCE file body,
//! returning an SPDX-ish identifier.

/// Identifies a license from its text. Only the first 4 KB matter; full
/// texts are unambiguous well before that.
pub fn detect_license_text(content: &str) -> Option<&'static str> {
    let head: String = content
        .chars()
        .take(4096)
        .collect::<String>()
        .to_lowercase();

    if head.contains("mit license") || head.contains("permission is hereby granted, free of charge")
    {
        return Some("MIT");
    }
    if head.contains("apache license") && head.contains("version 2.0") {
        return Some("Apache-2.0");
    }
    if head.contains("gnu lesser general public license") {
        return Some(if head.contains("version 3") {
            "LGPL-3.0"
        } else {
            "LGPL-2.1"
        });
    }
    if head.contains("gnu affero general public license") {
        return Some("AGPL-3.0");
    }
    if head.contains("gnu general public license") {
        return Some(if head.contains("version 3") {
            "GPL-3.0"
        } else {
            "GPL-2.0"
        });
    }
    if head.contains("mozilla public license") && head.contains("2.0") {
        return Some("MPL-2.0");
    }
    if head.contains("redistribution and use in source and binary forms") {
        return Some(if head.contains("neither the name") {
            "BSD-3-Clause"
        } else {
            "BSD-2-Clause"
        });
    }
    if head.contains("isc license")
        || (head.contains("permission to use, copy, modify") && head.contains("isc"))
    {
        return Some("ISC");
    }
    if head.contains("this is free and unencumbered software released into the public domain") {
        return Some("Unlicense");
    }

    None
}
