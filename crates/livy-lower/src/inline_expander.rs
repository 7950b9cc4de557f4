//! Capture-avoiding call-site inlining (`spec.md` §4.7).

use livy_ast::LExpr;
use rustc_hash::FxHashMap;

/// A function's body is only considered for inlining while its node count
/// stays within `INLINE_SIZE_UNIT * remaining_depth` — an implementation-
/// chosen threshold, bounded above by the configured depth as the spec
/// requires, without pinning an exact number.
const INLINE_SIZE_UNIT: usize = 8;

/// Inlines call sites up to `expansion_level` deep. `expansion_level == 0`
/// disables the pass entirely (the tree is returned unchanged).
#[must_use]
pub fn expand(expr: &LExpr, expansion_level: usize) -> LExpr {
    if expansion_level == 0 {
        log::debug!("inline expander: expansion_level is 0, pass disabled");
        return expr.clone();
    }
    log::debug!("inline expander: walking tree with budget {expansion_level}");
    let mut env = FxHashMap::default();
    let mut counter = 0u32;
    walk(expr, &mut env, &mut counter, expansion_level)
}

type FunctionEnv = FxHashMap<String, (Vec<String>, LExpr)>;

fn walk(expr: &LExpr, env: &FunctionEnv, counter: &mut u32, budget: usize) -> LExpr {
    match expr {
        LExpr::Scalar(..) | LExpr::Name(..) => expr.clone(),

        LExpr::Vector(span, kind, elements) => {
            LExpr::Vector(*span, *kind, elements.iter().map(|e| walk(e, env, counter, budget)).collect())
        }

        LExpr::Cond { span, pred, cons, else_ } => LExpr::Cond {
            span: *span,
            pred: Box::new(walk(pred, env, counter, budget)),
            cons: Box::new(walk(cons, env, counter, budget)),
            else_: Box::new(walk(else_, env, counter, budget)),
        },

        LExpr::Function { span, params, body } => {
            LExpr::Function { span: *span, params: params.clone(), body: Box::new(walk(body, env, counter, budget)) }
        }

        LExpr::NativeOperation { span, op, left, right } => LExpr::NativeOperation {
            span: *span,
            op: *op,
            left: Box::new(walk(left, env, counter, budget)),
            right: right.as_ref().map(|right| Box::new(walk(right, env, counter, budget))),
        },

        LExpr::FuncCall { span, func, args } => {
            let args: Vec<LExpr> = args.iter().map(|arg| walk(arg, env, counter, budget)).collect();
            if budget > 0 {
                if let LExpr::Name(_, name) = func.as_ref() {
                    if let Some((params, body)) = env.get(name) {
                        if params.len() == args.len() && size(body) <= INLINE_SIZE_UNIT * budget {
                            log::trace!("inline expander: inlining call to `{name}` ({} remaining)", budget - 1);
                            let inlined = inline_call(params, body, &args, counter);
                            return walk(&inlined, env, counter, budget - 1);
                        }
                    }
                }
            }
            LExpr::FuncCall { span: *span, func: Box::new(walk(func, env, counter, budget)), args }
        }

        LExpr::Block(span, elements) => {
            let mut local_env = env.clone();
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                if let LExpr::Define { span, target, value } = element {
                    let value = walk(value, &local_env, counter, budget);
                    if let LExpr::Function { params, body, .. } = &value {
                        local_env.insert(target.clone(), (params.clone(), (**body).clone()));
                    }
                    out.push(LExpr::Define { span: *span, target: target.clone(), value: Box::new(value) });
                } else {
                    out.push(walk(element, &local_env, counter, budget));
                }
            }
            LExpr::Block(*span, out)
        }

        LExpr::Define { span, target, value } => {
            LExpr::Define { span: *span, target: target.clone(), value: Box::new(walk(value, env, counter, budget)) }
        }
    }
}

/// Renames `params` to fresh unique names throughout `body`, then substitutes
/// `args` for those fresh names — the rename makes substitution
/// capture-avoiding since the fresh names cannot collide with anything the
/// caller or body already binds.
fn inline_call(params: &[String], body: &LExpr, args: &[LExpr], counter: &mut u32) -> LExpr {
    let fresh: Vec<String> = params
        .iter()
        .map(|param| {
            *counter += 1;
            format!("{param}__inline{counter}")
        })
        .collect();
    let rename_map: FxHashMap<&str, &str> =
        params.iter().map(String::as_str).zip(fresh.iter().map(String::as_str)).collect();
    let renamed_body = rename(body, &rename_map);

    let substitution: FxHashMap<&str, &LExpr> =
        fresh.iter().map(String::as_str).zip(args.iter()).collect();
    substitute(&renamed_body, &substitution)
}

fn rename(expr: &LExpr, mapping: &FxHashMap<&str, &str>) -> LExpr {
    let rename_one = |name: &str| mapping.get(name).map_or_else(|| name.to_string(), |fresh| (*fresh).to_string());
    match expr {
        LExpr::Scalar(..) => expr.clone(),
        LExpr::Name(span, name) => LExpr::Name(*span, rename_one(name)),
        LExpr::Vector(span, kind, elements) => {
            LExpr::Vector(*span, *kind, elements.iter().map(|e| rename(e, mapping)).collect())
        }
        LExpr::Cond { span, pred, cons, else_ } => LExpr::Cond {
            span: *span,
            pred: Box::new(rename(pred, mapping)),
            cons: Box::new(rename(cons, mapping)),
            else_: Box::new(rename(else_, mapping)),
        },
        LExpr::Function { span, params, body } => LExpr::Function {
            span: *span,
            params: params.iter().map(|p| rename_one(p)).collect(),
            body: Box::new(rename(body, mapping)),
        },
        LExpr::FuncCall { span, func, args } => LExpr::FuncCall {
            span: *span,
            func: Box::new(rename(func, mapping)),
            args: args.iter().map(|a| rename(a, mapping)).collect(),
        },
        LExpr::NativeOperation { span, op, left, right } => LExpr::NativeOperation {
            span: *span,
            op: *op,
            left: Box::new(rename(left, mapping)),
            right: right.as_ref().map(|right| Box::new(rename(right, mapping))),
        },
        LExpr::Block(span, elements) => LExpr::Block(*span, elements.iter().map(|e| rename(e, mapping)).collect()),
        LExpr::Define { span, target, value } => {
            LExpr::Define { span: *span, target: rename_one(target), value: Box::new(rename(value, mapping)) }
        }
    }
}

fn substitute(expr: &LExpr, mapping: &FxHashMap<&str, &LExpr>) -> LExpr {
    match expr {
        LExpr::Scalar(..) => expr.clone(),
        LExpr::Name(_, name) => mapping.get(name.as_str()).map_or_else(|| expr.clone(), |replacement| (*replacement).clone()),
        LExpr::Vector(span, kind, elements) => {
            LExpr::Vector(*span, *kind, elements.iter().map(|e| substitute(e, mapping)).collect())
        }
        LExpr::Cond { span, pred, cons, else_ } => LExpr::Cond {
            span: *span,
            pred: Box::new(substitute(pred, mapping)),
            cons: Box::new(substitute(cons, mapping)),
            else_: Box::new(substitute(else_, mapping)),
        },
        LExpr::Function { span, params, body } => {
            LExpr::Function { span: *span, params: params.clone(), body: Box::new(substitute(body, mapping)) }
        }
        LExpr::FuncCall { span, func, args } => LExpr::FuncCall {
            span: *span,
            func: Box::new(substitute(func, mapping)),
            args: args.iter().map(|a| substitute(a, mapping)).collect(),
        },
        LExpr::NativeOperation { span, op, left, right } => LExpr::NativeOperation {
            span: *span,
            op: *op,
            left: Box::new(substitute(left, mapping)),
            right: right.as_ref().map(|right| Box::new(substitute(right, mapping))),
        },
        LExpr::Block(span, elements) => LExpr::Block(*span, elements.iter().map(|e| substitute(e, mapping)).collect()),
        LExpr::Define { span, target, value } => {
            LExpr::Define { span: *span, target: target.clone(), value: Box::new(substitute(value, mapping)) }
        }
    }
}

fn size(expr: &LExpr) -> usize {
    1 + match expr {
        LExpr::Scalar(..) | LExpr::Name(..) => 0,
        LExpr::Vector(_, _, elements) | LExpr::Block(_, elements) => elements.iter().map(size).sum(),
        LExpr::Cond { pred, cons, else_, .. } => size(pred) + size(cons) + size(else_),
        LExpr::Function { body, .. } => size(body),
        LExpr::FuncCall { func, args, .. } => size(func) + args.iter().map(size).sum::<usize>(),
        LExpr::NativeOperation { left, right, .. } => size(left) + right.as_ref().map_or(0, |r| size(r)),
        LExpr::Define { value, .. } => size(value),
    }
}
