//! Cross-module scenarios: scene construction, backend capture and the
//! object-level queries exercised together.
