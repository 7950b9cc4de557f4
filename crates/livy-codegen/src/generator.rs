//! The instruction generator (`spec.md` §4.8).

use livy_ast::{LExpr, Literal, VectorKind};
use rustc_hash::FxHashMap;

use crate::instruction::Instruction;
use crate::scope::Scopes;

/// The three artifacts emission produces: the entry-point instruction
/// stream, the append-only function pool (indexed sub-streams), and the
/// append-only string pool (`spec.md` §3.3 invariant 5).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedProgram {
    pub stream: Vec<Instruction>,
    pub function_pool: Vec<Vec<Instruction>>,
    pub string_pool: Vec<String>,
}

/// Walks a lowered, constant-folded (and optionally inlined) tree and emits
/// instructions for it.
#[derive(Debug, Default)]
pub struct InstructionGenerator {
    scopes: Scopes,
    string_pool: Vec<String>,
    string_cache: FxHashMap<String, u64>,
    function_pool: Vec<Vec<Instruction>>,
}

impl InstructionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self { scopes: Scopes::root(), string_pool: Vec::new(), string_cache: FxHashMap::default(), function_pool: Vec::new() }
    }

    /// Generates a full program from its top-level (module-scope) `Block`.
    #[must_use]
    pub fn generate(mut self, program: &LExpr) -> GeneratedProgram {
        let stream = self.gen(program);
        GeneratedProgram { stream, function_pool: self.function_pool, string_pool: self.string_pool }
    }

    fn intern_string(&mut self, text: &str) -> u64 {
        if let Some(&index) = self.string_cache.get(text) {
            return index;
        }
        let index = u64::try_from(self.string_pool.len()).expect("fewer than u64::MAX strings");
        self.string_pool.push(text.to_string());
        self.string_cache.insert(text.to_string(), index);
        index
    }

    fn gen(&mut self, expr: &LExpr) -> Vec<Instruction> {
        match expr {
            LExpr::Scalar(_, literal) => vec![self.gen_literal(literal)],

            LExpr::Name(_, name) => {
                let (depth, slot) = self
                    .scopes
                    .resolve(name)
                    .unwrap_or_else(|| panic!("unbound name {name:?} reached codegen: a bug in an earlier phase"));
                vec![Instruction::LoadName { depth, slot }]
            }

            LExpr::Vector(_, kind, elements) => {
                let mut out = Vec::new();
                for element in elements {
                    out.extend(self.gen(element));
                }
                let n = u32::try_from(elements.len()).expect("fewer than u32::MAX elements");
                out.push(match kind {
                    VectorKind::List => Instruction::BuildList(n),
                    VectorKind::Tuple => Instruction::BuildTuple(n),
                });
                out
            }

            LExpr::Cond { pred, cons, else_, .. } => self.gen_cond(pred, cons, else_),

            LExpr::Function { params, body, .. } => {
                self.scopes.push();
                for param in params {
                    self.scopes.bind(param);
                }
                let body_code = self.gen(body);
                self.scopes.pop();
                let index = u64::try_from(self.function_pool.len()).expect("fewer than u64::MAX functions");
                self.function_pool.push(body_code);
                vec![Instruction::LoadFunc(index)]
            }

            LExpr::FuncCall { func, args, .. } => {
                let mut out = Vec::new();
                for arg in args {
                    out.extend(self.gen(arg));
                }
                out.extend(self.gen(func));
                let n = u32::try_from(args.len()).expect("fewer than u32::MAX arguments");
                out.push(Instruction::Call(n));
                out
            }

            LExpr::NativeOperation { op, left, right, .. } => {
                let mut out = Vec::new();
                // Right before left — see `SPEC_FULL.md`'s Open Question
                // decisions (derived from the recovered `collatz_step` trace).
                if let Some(right) = right {
                    out.extend(self.gen(right));
                }
                out.extend(self.gen(left));
                out.push(Instruction::Native(op.code()));
                out
            }

            LExpr::Block(_, elements) => {
                self.scopes.push();
                let mut out = Vec::new();
                for element in elements {
                    out.extend(self.gen(element));
                }
                self.scopes.pop();
                out
            }

            LExpr::Define { target, value, .. } => {
                let mut out = self.gen(value);
                let slot = self.scopes.bind(target);
                out.push(Instruction::StoreName { slot });
                out
            }
        }
    }

    fn gen_literal(&mut self, literal: &Literal) -> Instruction {
        match literal {
            Literal::Bool(b) => Instruction::LoadBool(*b),
            #[allow(clippy::cast_possible_truncation)]
            Literal::Int(i) => Instruction::LoadInt(*i as i32),
            #[allow(clippy::cast_possible_truncation)]
            Literal::Float(f) => Instruction::LoadFloat(*f as f32),
            Literal::String(s) => Instruction::LoadString(self.intern_string(s)),
        }
    }

    fn gen_cond(&mut self, pred: &LExpr, cons: &LExpr, else_: &LExpr) -> Vec<Instruction> {
        let pred_code = self.gen(pred);
        let cons_code = self.gen(cons);
        let else_code = self.gen(else_);

        let k = i32::try_from(cons_code.len() + 1).expect("branch target fits in i32");
        let m = i32::try_from(else_code.len()).expect("jump target fits in i32");

        let mut out = pred_code;
        out.push(Instruction::Branch(k));
        out.extend(cons_code);
        out.push(Instruction::Jump(m));
        out.extend(else_code);
        out
    }
}

#[cfg(test)]
mod tests {
    use livy_ast::NativeOp;
    use livy_source::Span;

    use super::*;

    fn int(n: i64) -> LExpr { LExpr::Scalar(Span::new(0, 1), Literal::Int(n)) }

    #[test]
    fn native_operation_evaluates_right_before_left() {
        // 3 * x + 1, with x bound at (1, 0)
        let mul = LExpr::NativeOperation {
            span: Span::new(0, 1),
            op: NativeOp::Mul,
            left: Box::new(int(3)),
            right: Some(Box::new(LExpr::Name(Span::new(0, 1), "x".into()))),
        };
        let add = LExpr::NativeOperation {
            span: Span::new(0, 1),
            op: NativeOp::Add,
            left: Box::new(mul),
            right: Some(Box::new(int(1))),
        };
        let mut gen = InstructionGenerator::new();
        gen.scopes.push();
        gen.scopes.bind("x");
        let code = gen.gen(&add);
        assert_eq!(
            code,
            vec![
                Instruction::LoadInt(1),
                Instruction::LoadName { depth: 1, slot: 0 },
                Instruction::LoadInt(3),
                Instruction::Native(NativeOp::Mul.code()),
                Instruction::Native(NativeOp::Add.code()),
            ]
        );
    }

    #[test]
    fn cond_branch_and_jump_offsets_count_the_other_branch() {
        let cond = LExpr::Cond {
            span: Span::new(0, 1),
            pred: Box::new(LExpr::Scalar(Span::new(0, 1), Literal::Bool(true))),
            cons: Box::new(int(1)),
            else_: Box::new(int(2)),
        };
        let code = InstructionGenerator::new().generate(&cond).stream;
        assert_eq!(
            code,
            vec![
                Instruction::LoadBool(true),
                Instruction::Branch(2),
                Instruction::LoadInt(1),
                Instruction::Jump(1),
                Instruction::LoadInt(2),
            ]
        );
    }

    #[test]
    fn nested_function_goes_into_the_function_pool() {
        let func = LExpr::Function {
            span: Span::new(0, 1),
            params: vec!["x".into()],
            body: Box::new(LExpr::Name(Span::new(0, 1), "x".into())),
        };
        let program = InstructionGenerator::new().generate(&func);
        assert_eq!(program.stream, vec![Instruction::LoadFunc(0)]);
        assert_eq!(program.function_pool.len(), 1);
        assert_eq!(program.function_pool[0], vec![Instruction::LoadName { depth: 1, slot: 0 }]);
    }

    #[test]
    fn s1_collatz_step_reference_scenario() {
        // let collatz_step = \n -> if n % 2 = 0 then \x -> 3*x + 1 else \x -> x
        fn native(op: NativeOp, left: LExpr, right: LExpr) -> LExpr {
            LExpr::NativeOperation { span: Span::new(0, 1), op, left: Box::new(left), right: Some(Box::new(right)) }
        }
        fn name(n: &str) -> LExpr { LExpr::Name(Span::new(0, 1), n.into()) }
        fn lambda(param: &str, body: LExpr) -> LExpr {
            LExpr::Function { span: Span::new(0, 1), params: vec![param.into()], body: Box::new(body) }
        }

        let pred = native(NativeOp::Equal, native(NativeOp::Mod, name("n"), int(2)), int(0));
        let cons = lambda("x", native(NativeOp::Add, native(NativeOp::Mul, int(3), name("x")), int(1)));
        let else_ = lambda("x", name("x"));
        let cond = LExpr::Cond { span: Span::new(0, 1), pred: Box::new(pred), cons: Box::new(cons), else_: Box::new(else_) };
        let define =
            LExpr::Define { span: Span::new(0, 1), target: "collatz_step".into(), value: Box::new(lambda("n", cond)) };

        let program = InstructionGenerator::new().generate(&define);

        // A single top-level definition, so the module scope's reserved
        // slot 0 pushes it to slot 1 (`Scopes::bind`).
        assert_eq!(program.stream, vec![Instruction::LoadFunc(2), Instruction::StoreName { slot: 1 }]);

        assert_eq!(
            program.function_pool[2],
            vec![
                Instruction::LoadInt(0),
                Instruction::LoadInt(2),
                Instruction::LoadName { depth: 1, slot: 0 },
                Instruction::Native(NativeOp::Mod.code()),
                Instruction::Native(NativeOp::Equal.code()),
                Instruction::Branch(2),
                Instruction::LoadFunc(0),
                Instruction::Jump(1),
                Instruction::LoadFunc(1),
            ]
        );
        assert_eq!(
            program.function_pool[0],
            vec![
                Instruction::LoadInt(1),
                Instruction::LoadName { depth: 2, slot: 0 },
                Instruction::LoadInt(3),
                Instruction::Native(NativeOp::Mul.code()),
                Instruction::Native(NativeOp::Add.code()),
            ]
        );
        assert_eq!(program.function_pool[1], vec![Instruction::LoadName { depth: 2, slot: 0 }]);
    }

    #[test]
    fn repeated_string_literals_share_a_pool_slot() {
        let block = LExpr::Block(
            Span::new(0, 1),
            vec![
                LExpr::Scalar(Span::new(0, 1), Literal::String("hi".into())),
                LExpr::Scalar(Span::new(0, 1), Literal::String("hi".into())),
            ],
        );
        let program = InstructionGenerator::new().generate(&block);
        assert_eq!(program.string_pool, vec!["hi".to_string()]);
        assert_eq!(program.stream, vec![Instruction::LoadString(0), Instruction::LoadString(0)]);
    }
}
