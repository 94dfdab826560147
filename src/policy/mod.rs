// Hierarchical permission presets and the access-rule evaluator bound to them
//
// - `PresetGraph` holds the immutable preset registry and expands grants
//   through `extends` edges (cycles allowed)
// - `Validator` evaluates `has` / `has_any_of` / `has_all_of` and composite
//   `match_one` / `match_all` rules against an expanded `PermissionSet`

pub mod clause;
pub mod preset;
pub mod validator;

pub use clause::{Clause, Matcher, Method};
pub use preset::{PermissionPreset, PermissionSet, PresetGraph};
pub use validator::Validator;
