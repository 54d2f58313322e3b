mod combinators;
mod host;
mod interop;
