//! Human-readable IR dump, mainly for tests and debugging.

use std::fmt::Write as _;

use hp_ast::NameInterner;

use crate::{Const, Function, InstKind, IrModule, PrimOp, Terminator, ValueId};

impl IrModule {
    /// Render the whole module as text.
    pub fn dump(&self, interner: &NameInterner) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "module {}", self.ident);
        for (idx, global) in self.globals.iter().enumerate() {
            let _ = writeln!(
                out,
                "g{idx}: {} ; {}",
                global.ty,
                interner.lookup(global.name)
            );
        }
        for func in &self.funcs {
            out.push('\n');
            out.push_str(&func.dump(interner));
        }
        out
    }
}

impl Function {
    /// Render one function as text.
    pub fn dump(&self, interner: &NameInterner) -> String {
        let mut out = String::new();
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        let _ = writeln!(
            out,
            "fn {}({}) -> {} {{",
            interner.lookup(self.name),
            params.join(", "),
            self.ret
        );
        for (idx, slot) in self.slots.iter().enumerate() {
            let _ = writeln!(
                out,
                "  slot{idx}: {} ; {}",
                slot.ty,
                interner.lookup(slot.name)
            );
        }
        for &block in &self.layout {
            let _ = writeln!(out, "{block:?}:");
            for &value in &self.block(block).insts {
                out.push_str(&self.dump_inst(value, interner));
            }
            match &self.block(block).terminator {
                Some(term) => out.push_str(&dump_terminator(term)),
                None => out.push_str("  <unterminated>\n"),
            }
        }
        out.push_str("}\n");
        out
    }

    fn dump_inst(&self, value: ValueId, interner: &NameInterner) -> String {
        let inst = self.value(value);
        let body = match &inst.kind {
            InstKind::Const(c) => match c {
                Const::Int(v) => format!("const {v}"),
                Const::Float(bits) => format!("const {}", f64::from_bits(*bits)),
                Const::Bool(v) => format!("const {v}"),
                Const::Str(name) => format!("const {:?}", interner.lookup(*name)),
                Const::Null => "const null".to_owned(),
            },
            InstKind::Param(n) => format!("param {n}"),
            InstKind::SlotAddr(slot) => format!("addr {slot:?}"),
            InstKind::GlobalAddr(global) => format!("addr {global:?}"),
            InstKind::Load { addr } => format!("load {addr:?}"),
            InstKind::Store { addr, value } => format!("store {addr:?}, {value:?}"),
            InstKind::FieldAddr { base, index } => format!("field {base:?}, {index}"),
            InstKind::Prim { op, args } => {
                let op = match op {
                    PrimOp::Binary(b) => format!("{b:?}").to_lowercase(),
                    PrimOp::Unary(u) => format!("{u:?}").to_lowercase(),
                };
                format!("{op} {args:?}")
            }
            InstKind::Call { func, args } => format!("call {func:?} {args:?}"),
            InstKind::Cast { value } => format!("cast {value:?}"),
            InstKind::Truthy { value } => format!("truthy {value:?}"),
        };
        if inst.has_result() {
            format!("  {value:?}: {} = {body}\n", inst.ty)
        } else {
            format!("  {body}\n")
        }
    }
}

fn dump_terminator(term: &Terminator) -> String {
    match term {
        Terminator::Return { value: Some(v) } => format!("  ret {v:?}\n"),
        Terminator::Return { value: None } => "  ret\n".to_owned(),
        Terminator::Jump { target } => format!("  jmp {target:?}\n"),
        Terminator::Branch {
            cond,
            then_block,
            else_block,
        } => format!("  br {cond:?}, {then_block:?}, {else_block:?}\n"),
        Terminator::Switch {
            scrutinee,
            cases,
            default,
        } => {
            let arms: Vec<String> = cases
                .iter()
                .map(|(v, b)| format!("{v} => {b:?}"))
                .collect();
            format!(
                "  switch {scrutinee:?} [{}], default {default:?}\n",
                arms.join(", ")
            )
        }
        Terminator::Unreachable => "  unreachable\n".to_owned(),
    }
}
