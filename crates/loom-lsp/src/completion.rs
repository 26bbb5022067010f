//! The completion engine (spec §4.F): turns a `CompletionContext` harvested
//! from a `COMPLETION`-mode analysis run into a ranked, de-duplicated list
//! of `CompletionItem`s.

use ahash::AHashSet;

use loom::sir::decl::{Decl, DeclBlock};
use loom::sir::expr::Expr;
use loom::sir::module::Module;
use loom::sir::stmt::Block;
use loom::sir::symbol::{Symbol, SymbolKind};
use loom::sir::symbol_table::SymbolTableId;
use loom::support::arena::Id;

/// LSP `CompletionItemKind` numbers this server emits (spec §6).
pub mod kind {
    pub const MODULE: u32 = 9;
    pub const METHOD: u32 = 2;
    pub const FUNCTION: u32 = 3;
    pub const CONSTANT: u32 = 21;
    pub const STRUCT: u32 = 22;
    pub const VARIABLE: u32 = 6;
    pub const FIELD: u32 = 5;
    pub const ENUM: u32 = 13;
    pub const ENUM_MEMBER: u32 = 20;
    pub const TYPE_PARAMETER: u32 = 25;
}

/// Where in the syntax the completion sentinel landed (spec §4.F). The
/// referenced nodes are identified by arena `Id` rather than borrowed
/// references, since the throwaway completion module and this context
/// outlive any single borrow of it.
#[derive(Debug, Clone, Copy)]
pub enum CompletionContext {
    InDeclBlock(Id<DeclBlock>),
    InBlock(Id<Block>),
    AfterDot(Id<Expr>),
    AfterImplicitDot(Id<Expr>),
    InUse,
    AfterUseDot(Id<Expr>),
    InStructLiteral(Id<Expr>),
    None,
}

/// How a candidate should be rendered as a snippet (spec §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Simple,
    FuncCallTemplate,
    StructLiteralTemplate,
    StructFieldTemplate,
}

#[derive(Debug, Clone)]
pub struct CompletionItem {
    pub label: String,
    pub kind: u32,
    pub insert_text: String,
    pub template: TemplateKind,
    /// The module a cross-module candidate came from, so the client can
    /// insert a `use` (spec §4.F: "tagged with the source module").
    pub source_module: Option<String>,
}

fn symbol_kind_number(kind: &SymbolKind) -> u32 {
    match kind {
        SymbolKind::Module(_) => kind::MODULE,
        SymbolKind::FuncDef(f) if f.is_method => kind::METHOD,
        SymbolKind::FuncDef(_) | SymbolKind::FuncDecl(_) | SymbolKind::NativeFuncDecl(_) => kind::FUNCTION,
        SymbolKind::ConstDef(_) => kind::CONSTANT,
        SymbolKind::StructDef(_) | SymbolKind::ProtoDef(_) => kind::STRUCT,
        SymbolKind::UnionDef(_) => kind::STRUCT,
        SymbolKind::EnumDef(_) => kind::ENUM,
        SymbolKind::EnumVariant(_) | SymbolKind::UnionCase(_) => kind::ENUM_MEMBER,
        SymbolKind::StructField(_) => kind::FIELD,
        SymbolKind::GenericParam(_) => kind::TYPE_PARAMETER,
        SymbolKind::VarDecl(_) | SymbolKind::NativeVarDecl(_) | SymbolKind::Local(_) | SymbolKind::Param(_) => kind::VARIABLE,
        SymbolKind::UseIdent(_) | SymbolKind::UseRebind(_) | SymbolKind::OverloadSet(_) | SymbolKind::GenericArg(_) | SymbolKind::GuardedSymbol => {
            kind::VARIABLE
        }
    }
}

fn func_call_snippet(module: &Module, func: &loom::sir::symbol::FuncDefSymbol, name: &str) -> String {
    let placeholders: Vec<String> = func
        .params
        .iter()
        .enumerate()
        .map(|(i, param_id)| {
            let param = module.arena.symbols.get(*param_id);
            format!("${{{}:{}}}", i + 1, param.get_name(&module.arena.strings))
        })
        .collect();
    format!("{name}({})", placeholders.join(", "))
}

fn item_for_symbol(module: &Module, symbol_id: Id<Symbol>, source_module: Option<&str>) -> Option<CompletionItem> {
    let symbol = module.arena.symbols.get(symbol_id);
    if symbol.is_guarded() {
        return None;
    }
    let name = symbol.get_name(&module.arena.strings).to_owned();
    let kind_num = symbol_kind_number(&symbol.kind);
    let (insert_text, template) = match &symbol.kind {
        SymbolKind::FuncDef(f) if !f.params.is_empty() => (func_call_snippet(module, f, &name), TemplateKind::FuncCallTemplate),
        _ => (name.clone(), TemplateKind::Simple),
    };
    Some(CompletionItem {
        label: name,
        kind: kind_num,
        insert_text,
        template,
        source_module: source_module.map(str::to_owned),
    })
}

/// One `StructFieldTemplate` item per field of `struct_def` not already
/// present as an entry in the struct literal (spec §4.F scenario (f):
/// `Point { x: 1, <cursor> }` offers `y` but not `x`).
fn missing_field_items(
    module: &Module,
    struct_def: &loom::sir::symbol::StructDefSymbol,
    entries: &[loom::sir::expr::StructLiteralEntry],
) -> Vec<CompletionItem> {
    struct_def
        .fields
        .iter()
        .filter(|field_id| {
            let field_name = module.arena.symbols.get(**field_id).name;
            !entries.iter().any(|entry| entry.field_name == field_name)
        })
        .map(|field_id| {
            let name = module.arena.symbols.get(*field_id).get_name(&module.arena.strings).to_owned();
            CompletionItem {
                insert_text: format!("{name}: $1"),
                label: name,
                kind: kind::FIELD,
                template: TemplateKind::StructFieldTemplate,
                source_module: None,
            }
        })
        .collect()
}

/// Candidates for `CompleteInBlock`/`CompleteInDeclBlock`: the in-scope
/// table plus ancestors, preamble symbols, and every other module's
/// top-level symbols (spec §4.F).
pub struct CompletionEngine;

impl CompletionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Gathers scope-chain candidates: the given table plus every ancestor,
    /// climbing `SymbolTable::parent` until the module root.
    fn scope_chain_candidates(&self, module: &Module, table: SymbolTableId) -> Vec<CompletionItem> {
        let mut items = Vec::new();
        let mut current = Some(table);
        while let Some(table_id) = current {
            let symbol_table = module.arena.tables.get(table_id);
            for (_, symbol_id) in symbol_table.iter_local() {
                if let Some(item) = item_for_symbol(module, symbol_id, None) {
                    items.push(item);
                }
            }
            current = symbol_table.parent();
        }
        items
    }

    fn preamble_candidates(&self, preamble: &crate::workspace::PreambleSymbols) -> Vec<CompletionItem> {
        preamble
            .entries
            .iter()
            .map(|(name, kind_num)| CompletionItem {
                label: name.clone(),
                kind: *kind_num,
                insert_text: name.clone(),
                template: TemplateKind::Simple,
                source_module: None,
            })
            .collect()
    }

    fn cross_module_candidates(&self, unit: &loom::sir::module::Unit, own_module: &loom::sir::module_path::ModulePath) -> Vec<CompletionItem> {
        let mut items = Vec::new();
        for path in unit.paths() {
            if path == own_module {
                continue;
            }
            let Some(module) = unit.get(path) else { continue };
            let table = module.root_table();
            for (_, symbol_id) in module.arena.tables.get(table).iter_local() {
                if let Some(item) = item_for_symbol(module, symbol_id, Some(&path.to_string())) {
                    items.push(item);
                }
            }
        }
        items
    }

    /// Members of a struct/pointer-to-struct receiver type for
    /// `CompleteAfterDot` (spec §4.F: "pointer types are auto-dereferenced;
    /// struct fields and methods are both offered").
    fn member_candidates(&self, module: &Module, receiver_type: Id<Expr>) -> Vec<CompletionItem> {
        let struct_symbol = resolve_struct_def(module, receiver_type);
        let Some(struct_symbol) = struct_symbol else { return Vec::new() };
        let SymbolKind::StructDef(struct_def) = &module.arena.symbols.get(struct_symbol).kind else {
            return Vec::new();
        };
        struct_def.fields.iter().filter_map(|id| item_for_symbol(module, *id, None)).collect()
    }

    /// Produces the ranked, de-duplicated candidate list for `context`
    /// (spec §4.F). De-duplication is by `(label, kind)` since symbol
    /// identity across the `own_module`/other-module split is not directly
    /// comparable without re-resolving each candidate's originating arena.
    #[must_use]
    pub fn complete(
        &self,
        module: &Module,
        unit: &loom::sir::module::Unit,
        preamble: &crate::workspace::PreambleSymbols,
        context: CompletionContext,
    ) -> Vec<CompletionItem> {
        let mut items = match context {
            CompletionContext::InDeclBlock(decl_block) => {
                let table = module.arena.decl_blocks.get(decl_block).table;
                let mut candidates = self.scope_chain_candidates(module, table);
                candidates.extend(self.preamble_candidates(preamble));
                candidates.extend(self.cross_module_candidates(unit, &module.path));
                candidates
            }
            CompletionContext::InBlock(block) => {
                let table = module.arena.blocks.get(block).table;
                let mut candidates = self.scope_chain_candidates(module, table);
                candidates.extend(self.preamble_candidates(preamble));
                candidates.extend(self.cross_module_candidates(unit, &module.path));
                candidates
            }
            CompletionContext::AfterDot(lhs) | CompletionContext::AfterImplicitDot(lhs) => self.member_candidates(module, lhs),
            CompletionContext::InStructLiteral(struct_literal) => {
                let entries = match &module.arena.exprs.get(struct_literal).kind {
                    loom::sir::expr::ExprKind::StructLiteral { entries, .. } => entries.as_slice(),
                    _ => &[],
                };
                let struct_symbol = resolve_struct_def(module, struct_literal);
                struct_symbol
                    .map(|id| match &module.arena.symbols.get(id).kind {
                        SymbolKind::StructDef(def) => missing_field_items(module, def, entries),
                        _ => Vec::new(),
                    })
                    .unwrap_or_default()
            }
            CompletionContext::InUse | CompletionContext::AfterUseDot(_) => unit
                .paths()
                .map(|path| CompletionItem {
                    label: path.to_string(),
                    kind: kind::MODULE,
                    insert_text: path.to_string(),
                    template: TemplateKind::Simple,
                    source_module: None,
                })
                .collect(),
            CompletionContext::None => Vec::new(),
        };

        let mut seen = AHashSet::new();
        items.retain(|item| seen.insert((item.label.clone(), item.kind)));
        items
    }
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_struct_def(module: &Module, expr: Id<Expr>) -> Option<Id<Symbol>> {
    match &module.arena.exprs.get(expr).kind {
        loom::sir::expr::ExprKind::Ident(symbol_id) => match &module.arena.symbols.get(*symbol_id).kind {
            SymbolKind::StructDef(_) => Some(*symbol_id),
            SymbolKind::Local(local) => local.type_expr.and_then(|t| resolve_struct_def(module, t)),
            SymbolKind::Param(param) => resolve_struct_def(module, param.type_expr),
            SymbolKind::VarDecl(var) => var.type_expr.and_then(|t| resolve_struct_def(module, t)),
            _ => None,
        },
        loom::sir::expr::ExprKind::PointerType(inner) => resolve_struct_def(module, *inner),
        loom::sir::expr::ExprKind::StructLiteral { type_expr, .. } => type_expr.and_then(|t| resolve_struct_def(module, t)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::decl::DeclKind;
    use loom::sir::module::Unit;
    use loom::sir::module_path::ModulePath;
    use loom::sir::symbol::{ConstDefSymbol, SemaStage, Symbol};
    use loom::sir::text::{empty_range, SourceLocation};

    fn loc() -> SourceLocation {
        SourceLocation::new(ModulePath::parse("main"), empty_range())
    }

    #[test]
    fn in_decl_block_lists_top_level_symbols_and_preamble() {
        let mut module = Module::new(ModulePath::parse("main"));
        let name = module.arena.create_string("PI");
        let symbol = module.arena.symbols.alloc(Symbol::new(
            name,
            loc(),
            SymbolKind::ConstDef(ConstDefSymbol {
                type_expr: None,
                value: None,
                stage: SemaStage::None,
            }),
        ));
        let decl = module.arena.decls.alloc(Decl::new(DeclKind::Const { symbol }, loc()));
        module.arena.decl_blocks.get_mut(module.root).push(decl);
        let table = module.arena.decl_blocks.get(module.root).table;
        module.arena.tables.get_mut(table).insert(name, symbol);

        let unit = Unit::new();
        let preamble = crate::workspace::PreambleSymbols::standard();
        let engine = CompletionEngine::new();
        let items = engine.complete(&module, &unit, &preamble, CompletionContext::InDeclBlock(module.root));

        assert!(items.iter().any(|i| i.label == "PI" && i.kind == kind::CONSTANT));
        assert!(items.iter().any(|i| i.label == "print"));
    }

    fn const_module(path: &str, name: &str) -> Module {
        let mut module = Module::new(ModulePath::parse(path));
        let name_id = module.arena.create_string(name);
        let symbol = module.arena.symbols.alloc(Symbol::new(
            name_id,
            loc(),
            SymbolKind::ConstDef(ConstDefSymbol {
                type_expr: None,
                value: None,
                stage: SemaStage::None,
            }),
        ));
        let decl = module.arena.decls.alloc(Decl::new(DeclKind::Const { symbol }, loc()));
        module.arena.decl_blocks.get_mut(module.root).push(decl);
        let table = module.arena.decl_blocks.get(module.root).table;
        module.arena.tables.get_mut(table).insert(name_id, symbol);
        module
    }

    #[test]
    fn struct_literal_offers_only_unset_fields() {
        use loom::sir::expr::{Expr, ExprKind, StructLiteralEntry};
        use loom::sir::symbol::{FieldSymbol, StructDefSymbol};

        let mut module = Module::new(ModulePath::parse("main"));
        let x_name = module.arena.create_string("x");
        let x_field = module.arena.symbols.alloc(Symbol::new(
            x_name,
            loc(),
            SymbolKind::StructField(FieldSymbol {
                type_expr: module.arena.exprs.alloc(Expr::new(ExprKind::PrimitiveType(loom::ssa::primitive::Primitive::I64), loc())),
                default: None,
                offset: None,
            }),
        ));
        let y_name = module.arena.create_string("y");
        let y_field = module.arena.symbols.alloc(Symbol::new(
            y_name,
            loc(),
            SymbolKind::StructField(FieldSymbol {
                type_expr: module.arena.exprs.alloc(Expr::new(ExprKind::PrimitiveType(loom::ssa::primitive::Primitive::I64), loc())),
                default: None,
                offset: None,
            }),
        ));

        let struct_name = module.arena.create_string("Point");
        let table = module.arena.create_symbol_table(None);
        let struct_symbol = module.arena.symbols.alloc(Symbol::new(
            struct_name,
            loc(),
            SymbolKind::StructDef(StructDefSymbol {
                fields: vec![x_field, y_field],
                table,
                generic_params: Vec::new(),
                specializations: Vec::new(),
                size: None,
                stage: SemaStage::None,
            }),
        ));

        let type_expr = module.arena.exprs.alloc(Expr::new(ExprKind::Ident(struct_symbol), loc()));
        let literal_value = module.arena.exprs.alloc(Expr::new(ExprKind::IntLiteral { value: 1, kind: loom::sir::expr::IntLiteralKind::Pseudo }, loc()));
        let struct_literal = module.arena.exprs.alloc(Expr::new(
            ExprKind::StructLiteral {
                type_expr: Some(type_expr),
                entries: vec![StructLiteralEntry { field_name: x_name, value: literal_value }],
            },
            loc(),
        ));

        let unit = Unit::new();
        let preamble = crate::workspace::PreambleSymbols::standard();
        let engine = CompletionEngine::new();
        let items = engine.complete(&module, &unit, &preamble, CompletionContext::InStructLiteral(struct_literal));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "y");
        assert_eq!(items[0].template, TemplateKind::StructFieldTemplate);
    }

    #[test]
    fn duplicates_are_removed_by_label_and_kind() {
        let module = const_module("main", "x");
        let other = const_module("other", "x");

        let mut unit = Unit::new();
        unit.replace(const_module("main", "x"));
        unit.replace(other);

        let preamble = crate::workspace::PreambleSymbols::standard();
        let engine = CompletionEngine::new();
        let items = engine.complete(&module, &unit, &preamble, CompletionContext::InDeclBlock(module.root));
        let count = items.iter().filter(|i| i.label == "x").count();
        assert_eq!(count, 1);
    }
}
