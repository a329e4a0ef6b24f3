//! SysY compiler library
//!
//! Lowers SysY source (a statically-typed C subset used in compiler
//! courses) to LLVM text IR suitable for an external LLVM toolchain.
//! Parsing, name resolution, constant folding, storage materialization,
//! and IR emission happen in one pass over the syntax tree; the runtime
//! library `sylib` is only declared, never linked here.
//!
//! ```rust
//! let ir = sysyc::compile_to_ir("int main() { return 0; }").unwrap();
//! assert!(ir.contains("define dso_local i32 @main()"));
//! ```

pub mod ast;
pub mod codegen;
pub mod parser;
pub mod symtab;
pub mod types;

pub use ast::CompUnit;
pub use codegen::{CodeGen, CodeGenError, IrEmitter};
pub use parser::Parser;
pub use symtab::{Symbol, SymbolTable};
pub use types::Type;

use std::fs;
use std::path::Path;

/// Compile a SysY source file to an LLVM text IR file.
pub fn compile_file(input_path: &Path, output_path: &Path) -> Result<(), String> {
    let source = fs::read_to_string(input_path)
        .map_err(|e| format!("Cannot open input file {}: {}", input_path.display(), e))?;

    let ir = compile_to_ir(&source)?;

    fs::write(output_path, ir)
        .map_err(|e| format!("Cannot open output file {}: {}", output_path.display(), e))
}

/// Compile a SysY source string to LLVM text IR.
pub fn compile_to_ir(source: &str) -> Result<String, String> {
    let mut parser = Parser::new(source);
    let unit = parser.parse()?;

    let mut codegen = CodeGen::new();
    codegen.generate(&unit).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(source: &str) -> String {
        compile_to_ir(source).unwrap()
    }

    #[test]
    fn test_constant_expression_folds_away() {
        let ir = lower("int main(){ return 1+2*3; }");
        assert!(!ir.contains("add"));
        assert!(!ir.contains("mul"));
        assert!(ir.contains("  ret i32 7\n"));
        // The fold is the final terminator: no fallback ret follows it
        assert!(ir.trim_end().ends_with("ret i32 7\n}"));
    }

    #[test]
    fn test_global_array_sized_by_constant() {
        let ir = lower("const int N = 10; int a[N]; int main(){ a[0]=5; return 0; }");
        assert!(ir.contains("@a = dso_local global [10 x i32] zeroinitializer\n"));
        assert!(ir.contains("@N = dso_local constant i32 10\n"));
        // Subscripted assignment lowers through an element pointer
        assert!(ir.contains("getelementptr [10 x i32], [10 x i32]* @a, i32 0, i32 0"));
        assert!(ir.contains("store i32 5, i32*"));
    }

    #[test]
    fn test_while_loop_shape() {
        let ir = lower("int main(){ int i=0; while(i<3){ i=i+1; } return i; }");
        assert!(ir.contains("icmp slt i32"));
        assert!(ir.contains("add i32"));
        assert!(ir.contains("label0:\n"));
        assert!(ir.contains("label1:\n"));
        assert!(ir.contains("  br label %label0\n"));
        assert!(ir.contains("label2:\n"));
        // The final block loads i and returns it
        let end = ir.rfind("label2:").unwrap();
        let tail = &ir[end..];
        assert!(tail.contains("load i32"));
        assert!(tail.contains("ret i32 %t"));
    }

    #[test]
    fn test_branching_function_and_call() {
        let ir = lower("int f(int x){ if(x>0) return x; else return -x; } int main(){ return f(-7); }");
        assert!(ir.contains("define dso_local i32 @f(i32 %x.param)"));
        assert!(ir.contains("icmp sgt i32"));
        assert!(ir.contains("call i32 @f(i32 -7)"));
        // Both branches return; the join block only holds the fallback
        let f_body = &ir[ir.find("@f").unwrap()..ir.find("@main").unwrap()];
        assert_eq!(f_body.matches("ret i32").count(), 3);
    }

    #[test]
    fn test_nested_constant_array_initializer() {
        let ir = lower("const int a[2][3] = {{1,2,3},{4}};");
        assert!(ir.contains(
            "@a = dso_local constant [2 x [3 x i32]] \
             [[3 x i32] [i32 1, i32 2, i32 3], [3 x i32] [i32 4, i32 0, i32 0]]\n"
        ));
    }

    #[test]
    fn test_sylib_call_chain() {
        let ir = lower("int main(){ putint(getint()); return 0; }");
        assert!(ir.contains("declare i32 @getint()\n"));
        assert!(ir.contains("declare void @putint(i32)\n"));
        let call = ir.find("call i32 @getint()").unwrap();
        let put = ir.find("call void @putint(i32 %t").unwrap();
        assert!(call < put);
    }

    #[test]
    fn test_header_precedes_body() {
        let ir = lower("int g; int main(){ return g; } int h;");
        let first_define = ir.find("define").unwrap();
        for needle in ["declare", "@g = dso_local", "@h = dso_local"] {
            assert!(ir.find(needle).unwrap() < first_define, "{} after define", needle);
        }
    }

    #[test]
    fn test_temporaries_and_labels_are_unique() {
        let ir = lower(
            "int main(){\n\
               int i = 0;\n\
               int s = 0;\n\
               while (i < 10) {\n\
                 if (i % 2 == 0) { s = s + i; } else { s = s - 1; }\n\
                 i = i + 1;\n\
               }\n\
               return s;\n\
             }",
        );
        let mut seen = std::collections::HashSet::new();
        for line in ir.lines() {
            let trimmed = line.trim_start();
            if let Some((def, _)) = trimmed.split_once(" = ")
                && def.starts_with("%t")
            {
                assert!(seen.insert(def.to_string()), "redefined {}", def);
            }
            if let Some(label) = line.strip_suffix(':')
                && label.starts_with("label")
            {
                assert!(seen.insert(label.to_string()), "redefined {}", label);
            }
        }
    }

    #[test]
    fn test_every_block_has_one_terminator() {
        let ir = lower(
            "void f(int n){\n\
               while (n) {\n\
                 if (n == 3) break;\n\
                 if (n == 4) continue;\n\
                 n = n - 1;\n\
               }\n\
             }\n\
             int main(){ f(9); return 0; }",
        );
        let body = &ir[ir.find("define").unwrap()..];
        let mut terminated = false;
        for line in body.lines() {
            let trimmed = line.trim();
            if trimmed.ends_with(':') || trimmed.starts_with("define") {
                terminated = false;
                continue;
            }
            if trimmed == "}" || trimmed.is_empty() {
                continue;
            }
            assert!(!terminated, "instruction after terminator: {}", trimmed);
            if trimmed.starts_with("br ") || trimmed.starts_with("ret ") {
                terminated = true;
            }
        }
    }

    #[test]
    fn test_scope_shadowing() {
        let ir = lower(
            "const int x = 1;\n\
             int main(){\n\
               int x = 2;\n\
               { int x = 3; putint(x); }\n\
               return x;\n\
             }",
        );
        // The outer local is loaded again after the inner scope closes
        assert!(ir.contains("load i32"));
        // The global constant never forces a global access in main
        assert!(!ir.contains("load i32, i32* @x"));
    }

    #[test]
    fn test_local_array_initializer_stores_every_slot() {
        let ir = lower("int main(){ int a[2][2] = {{1}, 2}; return a[1][0]; }");
        assert_eq!(ir.matches("store i32").count(), 4);
        assert!(ir.contains("store i32 1, i32*"));
        assert!(ir.contains("store i32 2, i32*"));
        // Padding slots store zero
        assert_eq!(ir.matches("store i32 0, i32*").count(), 2);
    }

    #[test]
    fn test_runtime_value_in_local_array_initializer() {
        let ir = lower("int main(){ int a[2] = {getint(), 1}; return a[0]; }");
        assert!(ir.contains("call i32 @getint()"));
        assert!(ir.contains("store i32 %t"));
    }

    #[test]
    fn test_logical_operators_have_no_short_circuit() {
        let ir = lower("int main(){ int a = getint(); return a && getint(); }");
        // Both calls execute: no extra branching is introduced for &&
        assert_eq!(ir.matches("call i32 @getint()").count(), 2);
        assert!(ir.contains("and i1"));
        assert!(ir.contains("zext i1"));
        assert!(!ir.contains("label"));
    }

    #[test]
    fn test_array_argument_decays_to_pointer() {
        let ir = lower("int a[8]; int main(){ return getarray(a); }");
        assert!(ir.contains("getelementptr [8 x i32], [8 x i32]* @a, i32 0, i32 0"));
        assert!(ir.contains("call i32 @getarray(i32* %t"));
    }

    #[test]
    fn test_undefined_names_do_not_abort() {
        let ir = compile_to_ir("int main(){ y = 3; mystery(); return 0; }").unwrap();
        assert!(!ir.contains("store"));
        assert!(!ir.contains("call"));
        assert!(ir.contains("  ret i32 0\n"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(compile_to_ir("int main( { return 0; }").is_err());
    }

    #[test]
    fn test_compile_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("prog.sy");
        let output = dir.path().join("prog.ll");
        std::fs::write(&input, "int main() { return 42; }").unwrap();

        compile_file(&input, &output).unwrap();

        let ir = std::fs::read_to_string(&output).unwrap();
        assert!(ir.contains("  ret i32 42\n"));
    }

    #[test]
    fn test_compile_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.sy");
        let output = dir.path().join("out.ll");
        let err = compile_file(&missing, &output).unwrap_err();
        assert!(err.contains("Cannot open input file"));
    }
}
