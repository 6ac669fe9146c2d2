//! Compilation pipeline driver.
//!
//! Glues the passes together: validate the AST, then lower it to IR.
//! IO-free by design — callers construct the AST (a parser, a test
//! builder, an embedding) and receive either an [`IrModule`] or a
//! [`CompileError`] carrying the full diagnostic report.
//!
//! ```text
//! hp_ast, hp_types, hp_sema, hp_lower, hp_ir
//!                    ↓
//!               hp_compiler  ← this crate
//! ```

use hp_ast::{Ast, NameInterner};
use hp_diagnostic::{DiagnosticEngine, Report};
use hp_ir::IrModule;
use hp_types::{TypeCtx, TypeOptions};

/// Configuration for a compilation run.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Allow pointer and floating-point truthiness in boolean contexts.
    pub boolean_context_conversion: bool,
    /// Identifier stamped on the produced module.
    pub module_ident: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            boolean_context_conversion: true,
            module_ident: "unit".to_string(),
        }
    }
}

/// Why a compilation run produced no module.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("validation failed with {error_count} error(s)")]
    ValidationFailed {
        error_count: usize,
        /// The full report, warnings included.
        report: Report,
    },
}

impl CompileError {
    /// The diagnostic report behind this error.
    pub fn report(&self) -> &Report {
        match self {
            CompileError::ValidationFailed { report, .. } => report,
        }
    }
}

/// One compilation context: type registry, interner, diagnostics.
///
/// A context can compile multiple units; interned names and types are
/// shared across them.
pub struct Compiler {
    options: CompileOptions,
    types: TypeCtx,
    interner: NameInterner,
    engine: DiagnosticEngine,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler {
            options,
            types: TypeCtx::new(),
            interner: NameInterner::new(),
            engine: DiagnosticEngine::new(),
        }
    }

    /// The interner AST producers for this context must use.
    pub fn interner(&self) -> &NameInterner {
        &self.interner
    }

    pub fn types(&self) -> &TypeCtx {
        &self.types
    }

    /// Validate and lower one compilation unit.
    ///
    /// On success the unit's warnings remain queryable through the
    /// engine the run used; on failure the report rides on the error.
    pub fn compile(&mut self, ast: &Ast) -> Result<IrModule, CompileError> {
        let type_options = TypeOptions {
            boolean_context_conversion: self.options.boolean_context_conversion,
        };

        let validation = {
            let _span = tracing::info_span!("validate", ident = %self.options.module_ident)
                .entered();
            hp_sema::validate_unit(
                ast,
                &self.types,
                &self.interner,
                &type_options,
                &mut self.engine,
            )
        };
        if !validation.passed {
            let error_count = validation.report.error_count();
            tracing::warn!(error_count, "compilation aborted after validation");
            return Err(CompileError::ValidationFailed {
                error_count,
                report: validation.report,
            });
        }

        let _span = tracing::info_span!("lower", ident = %self.options.module_ident).entered();
        Ok(hp_lower::lower_unit(
            ast,
            &validation.output,
            &self.types,
            &self.interner,
            &self.options.module_ident,
        ))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_ast::{
        Decl, DeclKind, Expr, ExprKind, Name, Span, Stmt, StmtKind, Symbol,
    };
    use pretty_assertions::assert_eq;

    fn unit_with_root() -> Ast {
        let mut ast = Ast::new();
        let root = ast.alloc_decl(Decl {
            kind: DeclKind::Namespace { members: vec![] },
            name: Name::EMPTY,
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: None,
        });
        ast.set_root(root);
        ast
    }

    #[test]
    fn empty_unit_compiles_to_empty_module() {
        let mut compiler = Compiler::new(CompileOptions {
            module_ident: "empty".to_string(),
            ..CompileOptions::default()
        });
        let ast = unit_with_root();
        let module = match compiler.compile(&ast) {
            Ok(module) => module,
            Err(err) => panic!("unexpected failure: {err}"),
        };
        assert_eq!(module.ident, "empty");
        assert_eq!(module.func_count(), 0);
    }

    #[test]
    fn failed_validation_surfaces_the_report() {
        let mut compiler = Compiler::default();
        let mut ast = unit_with_root();

        let Some(root) = ast.root() else {
            unreachable!("root installed above");
        };
        let ghost = Symbol::new(compiler.interner().intern("ghost"), None);
        let name_ref = ast.alloc_expr(Expr::new(ExprKind::NameRef(ghost), Span::DUMMY));
        let stmt = ast.alloc_stmt(Stmt::new(StmtKind::Expr(name_ref), Span::DUMMY));
        let body = ast.alloc_stmt(Stmt::new(StmtKind::Block(vec![stmt]), Span::DUMMY));
        let func = ast.alloc_decl(Decl {
            kind: DeclKind::Function {
                params: vec![],
                ret: None,
                body: Some(body),
            },
            name: compiler.interner().intern("haunted"),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container: Some(root),
        });
        ast.add_member(root, func);

        let Err(err) = compiler.compile(&ast) else {
            panic!("expected validation failure");
        };
        assert_eq!(err.report().error_count(), 1);
        assert_eq!(
            err.to_string(),
            "validation failed with 1 error(s)"
        );
    }
}
