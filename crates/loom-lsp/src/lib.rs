//! The incremental completion engine and workspace (spec §4.F): a
//! JSON-RPC-over-stdio language server in the shape of `ouros-mcp`'s
//! framed-message loop, speaking LSP instead of MCP.

pub mod completion;
pub mod db;
pub mod handler;
pub mod index;
pub mod workspace;
