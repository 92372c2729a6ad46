// Attribute slots, matching the `layout(location = N)` qualifiers in `shaders/`.
pub const POSITION_ATTRIBUTE_SLOT: u32 = 0;
pub const COLOR_ATTRIBUTE_SLOT: u32 = 1;
pub const TEXCOORD_ATTRIBUTE_SLOT: u32 = 2;

/// Listing started when none is named on the command line.
pub const DEFAULT_LISTING: &str = "hello-triangle";
