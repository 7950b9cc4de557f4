//! Topological sort of sibling `Define`s within a block (`spec.md` §4.3).
//!
//! Driver-controlled: `livy-compiler` only calls [`sort_defines`] when its
//! `CompileConfig::sort_defs` flag is set. A cycle is never an error here —
//! the type inferer is the final arbiter of whether a non-`Function` cycle
//! is actually legal recursion.

use livy_ast::Expr;
use rustc_hash::{FxHashMap, FxHashSet};

/// Reorders the `Define`s inside every maximal run of consecutive `Define`s
/// at `expr`'s top level (and, recursively, inside every nested `Block`,
/// `Function` body, and `Define` body) so that a definition referencing
/// another's name comes after it, except within a cycle, where members keep
/// their original textual order.
#[must_use]
pub fn sort_defines(expr: &Expr) -> Expr {
    match expr {
        Expr::Block(id, span, elements) => {
            let elements = sort_runs(elements);
            Expr::Block(*id, *span, elements.iter().map(sort_defines).collect())
        }
        Expr::Function { id, span, param, body } => Expr::Function {
            id: *id,
            span: *span,
            param: param.clone(),
            body: Box::new(sort_defines(body)),
        },
        Expr::Define { id, span, target, value, body } => Expr::Define {
            id: *id,
            span: *span,
            target: target.clone(),
            value: Box::new(sort_defines(value)),
            body: body.as_ref().map(|body| Box::new(sort_defines(body))),
        },
        Expr::Cond { id, span, pred, cons, else_ } => Expr::Cond {
            id: *id,
            span: *span,
            pred: Box::new(sort_defines(pred)),
            cons: Box::new(sort_defines(cons)),
            else_: Box::new(sort_defines(else_)),
        },
        Expr::FuncCall { id, span, caller, callee } => Expr::FuncCall {
            id: *id,
            span: *span,
            caller: Box::new(sort_defines(caller)),
            callee: Box::new(sort_defines(callee)),
        },
        Expr::Vector(id, span, kind, elements) => {
            Expr::Vector(*id, *span, *kind, elements.iter().map(sort_defines).collect())
        }
        Expr::Scalar(..) | Expr::Name(..) => expr.clone(),
    }
}

/// Reorders each maximal run of consecutive `Define`s in `elements`, leaving
/// non-`Define` elements fixed in place.
fn sort_runs(elements: &[Expr]) -> Vec<Expr> {
    let mut out = Vec::with_capacity(elements.len());
    let mut i = 0;
    while i < elements.len() {
        if matches!(elements[i], Expr::Define { .. }) {
            let start = i;
            while i < elements.len() && matches!(elements[i], Expr::Define { .. }) {
                i += 1;
            }
            out.extend(sort_define_run(&elements[start..i]));
        } else {
            out.push(elements[i].clone());
            i += 1;
        }
    }
    out
}

fn target_name(define: &Expr) -> &str {
    let Expr::Define { target, .. } = define else { unreachable!("caller only passes Defines") };
    let Expr::Name(_, _, name, _) = target.as_ref() else { unreachable!("a Define's target is a Name") };
    name
}

/// Tarjan's SCC algorithm, then the components are emitted in dependency
/// order. Each component's own members keep their original relative order
/// (trivial for size-1 components; required by `spec.md` for genuine cycles).
fn sort_define_run(defines: &[Expr]) -> Vec<Expr> {
    let n = defines.len();
    let index_of: FxHashMap<&str, usize> =
        defines.iter().enumerate().map(|(i, d)| (target_name(d), i)).collect();

    // Edge i -> j when j's value references i's name free: i must precede j.
    let mut edges = vec![Vec::new(); n];
    for (j, define) in defines.iter().enumerate() {
        let Expr::Define { value, .. } = define else { unreachable!() };
        let free = free_names(value);
        for name in &free {
            if let Some(&i) = index_of.get(name.as_str()) {
                if i != j {
                    edges[i].push(j);
                }
            }
        }
    }

    let components = tarjan_scc(n, &edges);
    log::trace!("topo sort: {n} sibling defines into {} strongly connected component(s)", components.len());
    let mut out = Vec::with_capacity(n);
    for component in components {
        let mut members: Vec<usize> = component;
        members.sort_unstable();
        for i in members {
            out.push(defines[i].clone());
        }
    }
    out
}

/// Returns Tarjan's strongly connected components, in reverse-topological
/// order of indices reachable from this component's nodes to the indices
/// that depend on them — i.e. in forward dependency order already, since
/// Tarjan's algorithm yields components in reverse order of completion.
fn tarjan_scc(n: usize, edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct State {
        index: Vec<Option<usize>>,
        low_link: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next_index: usize,
        components: Vec<Vec<usize>>,
    }

    fn strong_connect(v: usize, edges: &[Vec<usize>], state: &mut State) {
        state.index[v] = Some(state.next_index);
        state.low_link[v] = state.next_index;
        state.next_index += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for &w in &edges[v] {
            if state.index[w].is_none() {
                strong_connect(w, edges, state);
                state.low_link[v] = state.low_link[v].min(state.low_link[w]);
            } else if state.on_stack[w] {
                state.low_link[v] = state.low_link[v].min(state.index[w].expect("checked is_some"));
            }
        }

        if state.low_link[v] == state.index[v].expect("just set above") {
            let mut component = Vec::new();
            loop {
                let w = state.stack.pop().expect("v's own SCC is still on the stack");
                state.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            state.components.push(component);
        }
    }

    let mut state = State {
        index: vec![None; n],
        low_link: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next_index: 0,
        components: Vec::new(),
    };
    for v in 0..n {
        if state.index[v].is_none() {
            strong_connect(v, edges, &mut state);
        }
    }
    // Tarjan emits components in reverse topological order (a component is
    // closed only once nothing reachable from it remains open) — reverse to
    // get dependency order, edge source before edge target.
    state.components.reverse();
    state.components
}

/// Every free `Name` reference syntactically reachable from `expr`. This is
/// a conservative over-approximation (it does not exclude names shadowed by
/// an inner binder) — acceptable since the sorter is a reordering heuristic,
/// not a correctness requirement: the inferer independently rejects any
/// value-level recursion that doesn't actually type-check.
fn free_names(expr: &Expr) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    collect_names(expr, &mut names);
    names
}

fn collect_names(expr: &Expr, names: &mut FxHashSet<String>) {
    match expr {
        Expr::Scalar(..) => {}
        Expr::Name(_, _, name, _) => {
            names.insert(name.clone());
        }
        Expr::Vector(_, _, _, elements) => {
            for element in elements {
                collect_names(element, names);
            }
        }
        Expr::Cond { pred, cons, else_, .. } => {
            collect_names(pred, names);
            collect_names(cons, names);
            collect_names(else_, names);
        }
        Expr::Function { body, .. } => collect_names(body, names),
        Expr::FuncCall { caller, callee, .. } => {
            collect_names(caller, names);
            collect_names(callee, names);
        }
        Expr::Define { value, body, .. } => {
            collect_names(value, names);
            if let Some(body) = body {
                collect_names(body, names);
            }
        }
        Expr::Block(_, _, elements) => {
            for element in elements {
                collect_names(element, names);
            }
        }
    }
}
