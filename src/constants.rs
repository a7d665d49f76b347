// Constants for the compiler core

/// Initial capacity of a freshly created dynamic string (including the terminator slot)
pub const STRING_INIT_SIZE: usize = 8;

/// Number of bytes a full dynamic string grows by on append
pub const STRING_RESIZE_INCREMENT: usize = 8;

/// Number of frame slots allocated when the frame stack is initialized
pub const FRAME_ARRAY_INIT_SIZE: usize = 10;

/// Frame array capacity is multiplied by this factor on overflow
pub const FRAME_ARRAY_EXPAND_FACTOR: usize = 2;

/// Id of the global frame; also the bottom of every frame chain
pub const GLOBAL_FRAME_ID: usize = 0;

/// Reserved namespace of built-in functions (`ifj.write`, `ifj.length`, ...)
pub const BUILTIN_NAMESPACE: &str = "ifj";

/// Separator between the built-in namespace and the function name
pub const BUILTIN_SEPARATOR: char = '.';

/// Radix used when materializing integer literals
pub const INT_CONVERSION_BASE: u32 = 10;

/// Identifier of the discard target (`_ = expr;`), never looked up in scopes
pub const DISCARD_IDENTIFIER: &str = "_";
