//! sylib runtime declarations
//!
//! The I/O and timing primitives of the SysY runtime library are external
//! functions: the compiler only declares them and records their
//! signatures in the global scope. The single table below keeps the
//! declaration lines and the registered signatures in step.

use super::CodeGen;
use crate::symtab::Symbol;
use crate::types::Type;

/// One sylib function: its `declare` line and its registered signature.
struct SylibDecl {
    decl: &'static str,
    name: &'static str,
    signature: fn() -> Type,
}

/// Every sylib function, in declaration order.
///
/// `putf` is declared variadic over `i8*` in the IR; the registered
/// signature narrows the format pointer to `i32*` because the type model
/// has no byte type and the language has no string literals to call it
/// with.
const SYLIB_DECLARATIONS: &[SylibDecl] = &[
    SylibDecl {
        decl: "declare i32 @getint()",
        name: "getint",
        signature: || Type::function(Type::Int, vec![]),
    },
    SylibDecl {
        decl: "declare i32 @getch()",
        name: "getch",
        signature: || Type::function(Type::Int, vec![]),
    },
    SylibDecl {
        decl: "declare i32 @getarray(i32*)",
        name: "getarray",
        signature: || Type::function(Type::Int, vec![Type::pointer(Type::Int)]),
    },
    SylibDecl {
        decl: "declare void @putint(i32)",
        name: "putint",
        signature: || Type::function(Type::Void, vec![Type::Int]),
    },
    SylibDecl {
        decl: "declare void @putch(i32)",
        name: "putch",
        signature: || Type::function(Type::Void, vec![Type::Int]),
    },
    SylibDecl {
        decl: "declare void @putarray(i32, i32*)",
        name: "putarray",
        signature: || Type::function(Type::Void, vec![Type::Int, Type::pointer(Type::Int)]),
    },
    SylibDecl {
        decl: "declare void @putf(i8*, ...)",
        name: "putf",
        signature: || Type::function(Type::Void, vec![Type::pointer(Type::Int)]),
    },
    SylibDecl {
        decl: "declare void @starttime()",
        name: "starttime",
        signature: || Type::function(Type::Void, vec![]),
    },
    SylibDecl {
        decl: "declare void @stoptime()",
        name: "stoptime",
        signature: || Type::function(Type::Void, vec![]),
    },
];

impl CodeGen {
    /// Emit the sylib `declare` lines into the header stream and register
    /// the corresponding function symbols in the global scope.
    pub(super) fn install_sylib(&mut self) {
        for entry in SYLIB_DECLARATIONS {
            self.ir.header().push_str(entry.decl);
            self.ir.header().push('\n');
            self.symbols
                .declare(Symbol::new(entry.name, (entry.signature)()));
        }
        self.ir.header().push('\n');
    }
}
