//! Provider implementations.
//!
//! | Provider | Module |
//! |----------|--------|
//! | Anthropic Messages API | [`anthropic`] |

pub mod anthropic;
