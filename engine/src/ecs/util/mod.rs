pub(crate) mod macros;
