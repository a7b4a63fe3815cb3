//! Control flow emulation
//!
//! OverpassQL has filters and `foreach` but no branching. Conditions become
//! `(if: ...)` filters on sets; a statement runs conditionally by looping over
//! a set that holds either one element or none.
//!
//! `if` filters the configured pivot element by the condition and loops over
//! the result. `break`/`continue` keep a sentinel set per loop (seeded with the
//! pivot) that the jump empties; statements that may run after a jump are
//! wrapped in a `foreach` over the sentinel.

use crate::ast::core::{Cond, SetExpr, SetKind, Statement};
use crate::config::Pivot;
use crate::error::{DiagnosticKind, ErrorKind};

use super::expr::Fragment;
use super::{Translation, Translator, bind, foreach_block};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Jump {
    Break,
    Continue,
}

/// Jumps a statement can take out of the innermost enclosing loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Jumps {
    brk: bool,
    cont: bool,
}

impl Jumps {
    fn in_body(body: &[Statement]) -> Self {
        body.iter().fold(Jumps::default(), |acc, statement| {
            acc.merge(Jumps::in_statement(statement))
        })
    }

    fn in_statement(statement: &Statement) -> Self {
        match statement {
            Statement::Break => Jumps {
                brk: true,
                cont: false,
            },
            Statement::Continue => Jumps {
                brk: false,
                cont: true,
            },
            Statement::If { then, orelse, .. } => {
                Jumps::in_body(then).merge(Jumps::in_body(orelse.as_deref().unwrap_or_default()))
            }
            // Jumps in a nested loop body leave that loop; its else belongs to us
            Statement::ForEach { orelse, .. } => Jumps::in_body(orelse),
            _ => Jumps::default(),
        }
    }

    fn merge(self, other: Jumps) -> Self {
        Jumps {
            brk: self.brk || other.brk,
            cont: self.cont || other.cont,
        }
    }

    fn any(self) -> bool {
        self.brk || self.cont
    }
}

#[derive(Debug, Default)]
pub(super) struct LoopFrame {
    break_sentinel: Option<String>,
    continue_sentinel: Option<String>,
    /// Loop variable of guard foreach blocks
    guard: Option<String>,
    /// A specific kind other than the pivot's; filtering by it empties a sentinel
    drain: Option<SetKind>,
    /// Whether following statements must check the sentinel
    break_armed: bool,
    continue_armed: bool,
}

impl LoopFrame {
    /// `(sentinel, guard)` pairs, outermost first
    fn active_guards(&self) -> Vec<(String, String)> {
        let Some(guard) = &self.guard else {
            return Vec::new();
        };
        let mut guards = Vec::new();
        if self.break_armed
            && let Some(sentinel) = &self.break_sentinel
        {
            guards.push((sentinel.clone(), guard.clone()));
        }
        if self.continue_armed
            && let Some(sentinel) = &self.continue_sentinel
        {
            guards.push((sentinel.clone(), guard.clone()));
        }
        guards
    }
}

impl Translator<'_> {
    // ============ Ternary ============

    pub(super) fn ternary(
        &mut self,
        cond: &Cond,
        then: &SetExpr,
        orelse: &SetExpr,
        setup: &mut Vec<String>,
    ) -> Translation<Fragment> {
        let cond = cond.to_string();
        if orelse.is_empty_construct() {
            return self.conditional(then, &cond, setup);
        }

        let then = self.conditional(then, &cond, setup)?;
        let orelse = self.conditional(orelse, &format!("!({cond})"), setup)?;
        let first = self.symbols.fresh("ternary");
        setup.push(bind(&first, &then.text));
        let second = self.symbols.fresh("ternary");
        setup.push(bind(&second, &orelse.text));
        Ok(Fragment {
            text: format!("(.{first}; .{second})"),
            kind: then.kind.common(orelse.kind),
        })
    }

    /// Elements of `expr` for which `cond` holds
    fn conditional(&mut self, expr: &SetExpr, cond: &str, setup: &mut Vec<String>) -> Translation<Fragment> {
        let filter = format!("(if: {cond})");
        match expr {
            // Filtering nothing leaves nothing
            SetExpr::Construct(construct) if construct.is_empty() => {
                return self.set_expr(expr, setup);
            }
            SetExpr::Construct(construct) if construct.kind.is_specific() => {
                let fragment = self.set_expr(expr, setup)?;
                return Ok(Fragment {
                    text: fragment.text + &filter,
                    kind: fragment.kind,
                });
            }
            _ => {}
        }

        let (name, kind) = self.named(expr, "cond", setup)?;
        if kind.is_specific() {
            return Ok(Fragment {
                text: format!("{}.{name}{filter}", kind.keyword()),
                kind,
            });
        }

        self.diagnose(
            DiagnosticKind::KindDecomposition,
            format!("conditional filter on mixed-kind set `{name}` is applied once per element kind"),
        );
        let parts: Vec<String> = SetKind::SPECIFIC
            .iter()
            .map(|kind| format!("{}.{name}{filter}", kind.keyword()))
            .collect();
        Ok(Fragment {
            text: format!("({})", parts.join("; ")),
            kind: SetKind::Generic,
        })
    }

    // ============ If / else ============

    pub(super) fn if_statement(
        &mut self,
        cond: &Cond,
        then: &[Statement],
        orelse: Option<&[Statement]>,
    ) -> Translation<Vec<String>> {
        let pivot = self.pivot()?;
        let keyword = pivot.kind.keyword();
        let cond = cond.to_string();
        let mut lines = Vec::new();

        let reference = self.symbols.fresh("if");
        lines.push(bind(&reference, &pivot_set(pivot)));

        // Both branch sets are computed before either body runs
        let then_set = self.symbols.fresh("then");
        lines.push(bind(
            &then_set,
            &format!("{keyword}.{reference}(if: {cond})"),
        ));
        let else_set = match orelse {
            Some(_) => {
                let else_set = self.symbols.fresh("else");
                lines.push(bind(
                    &else_set,
                    &format!("{keyword}.{reference}(if: !({cond}))"),
                ));
                Some(else_set)
            }
            None => None,
        };
        let branch = self.symbols.fresh("branch");

        let armed = self.armed();
        let then_lines = self.block(then, 0)?;
        lines.push(foreach_block(&then_set, &branch, &then_lines));

        if let (Some(else_set), Some(orelse)) = (else_set, orelse) {
            // A jump in the then-branch does not affect the else-branch
            self.set_armed(armed);
            let else_lines = self.block(orelse, then.len())?;
            lines.push(foreach_block(&else_set, &branch, &else_lines));
        }
        Ok(lines)
    }

    // ============ Loops ============

    pub(super) fn for_each(
        &mut self,
        var: &str,
        iterable: &SetExpr,
        body: &[Statement],
        orelse: &[Statement],
    ) -> Translation<Vec<String>> {
        let mut lines = Vec::new();
        let (source, kind) = self.named(iterable, "for", &mut lines)?;
        self.symbols
            .declare(var, kind)
            .map_err(|kind| self.error(kind))?;

        let jumps = Jumps::in_body(body);
        let mut frame = LoopFrame::default();
        let mut body_lines = Vec::new();
        if jumps.any() {
            let pivot = self.pivot()?;
            let seed = pivot_set(pivot);
            frame.guard = Some(self.symbols.fresh("guard"));
            frame.drain = Some(drain_kind(pivot.kind));
            if jumps.brk {
                let sentinel = self.symbols.fresh("brk");
                lines.push(bind(&sentinel, &seed));
                frame.break_sentinel = Some(sentinel);
                // Every statement is skipped once a previous iteration broke out
                frame.break_armed = true;
            }
            if jumps.cont {
                let sentinel = self.symbols.fresh("cont");
                // Reset at the start of every iteration
                body_lines.push(bind(&sentinel, &seed));
                frame.continue_sentinel = Some(sentinel);
            }
            self.diagnose(
                DiagnosticKind::GuardedLoop,
                format!(
                    "loop over `{source}` uses break/continue; statements after a jump run inside an extra foreach each"
                ),
            );
        }

        self.loops.push(frame);
        let translated = self.block(body, 0);
        let frame = self.loops.pop();
        body_lines.extend(translated?);
        lines.push(foreach_block(&source, var, &body_lines));

        // for-else runs unless the loop was left through break
        let else_lines = self.block(orelse, body.len())?;
        match frame.and_then(|frame| frame.break_sentinel.zip(frame.guard)) {
            Some((sentinel, guard)) => lines.extend(wrap(else_lines, &sentinel, &guard)),
            None => lines.extend(else_lines),
        }
        Ok(lines)
    }

    pub(super) fn jump(&mut self, jump: Jump) -> Translation<Vec<String>> {
        let keyword = match jump {
            Jump::Break => "break",
            Jump::Continue => "continue",
        };
        let Some(frame) = self.loops.last() else {
            return Err(self.error(ErrorKind::UnsupportedConstruct(format!(
                "`{keyword}` outside a loop"
            ))));
        };
        let sentinel = match jump {
            Jump::Break => &frame.break_sentinel,
            Jump::Continue => &frame.continue_sentinel,
        };
        let (Some(sentinel), Some(drain)) = (sentinel, frame.drain) else {
            return Err(self.error(ErrorKind::UnsupportedConstruct(format!(
                "`{keyword}` in this position"
            ))));
        };
        // Empty the sentinel: none of its elements has the drain kind
        Ok(vec![bind(sentinel, &format!("{}.{sentinel}", drain.keyword()))])
    }

    /// Translate one statement of a body, wrapped in the guards of the
    /// innermost loop that are armed at this point
    pub(super) fn guarded(&mut self, statement: &Statement) -> Translation<Vec<String>> {
        let Some(frame) = self.loops.last_mut() else {
            return self.statement(statement);
        };
        let jumps = Jumps::in_statement(statement);
        // Jumps are guarded too: a break after a taken continue must not fire
        let guards = frame.active_guards();
        let saved = (frame.break_armed, frame.continue_armed);
        // Already inside the guards: nested statements start unarmed
        frame.break_armed = false;
        frame.continue_armed = false;

        let translated = self.statement(statement);
        self.set_armed(saved);
        let mut lines = translated?;
        self.arm(jumps);

        for (sentinel, guard) in guards.iter().rev() {
            lines = wrap(lines, sentinel, guard);
        }
        Ok(lines)
    }

    fn armed(&self) -> (bool, bool) {
        self.loops
            .last()
            .map_or((false, false), |frame| (frame.break_armed, frame.continue_armed))
    }

    fn set_armed(&mut self, (brk, cont): (bool, bool)) {
        if let Some(frame) = self.loops.last_mut() {
            frame.break_armed = brk;
            frame.continue_armed = cont;
        }
    }

    fn arm(&mut self, jumps: Jumps) {
        if let Some(frame) = self.loops.last_mut() {
            frame.break_armed |= jumps.brk;
            frame.continue_armed |= jumps.cont;
        }
    }

    fn pivot(&self) -> Translation<Pivot> {
        let pivot = self
            .config
            .pivot
            .ok_or_else(|| self.error(ErrorKind::MissingPivot))?;
        if !pivot.kind.is_specific() {
            return Err(self.error(ErrorKind::KindMismatch {
                expected: "a specific element kind",
                found: pivot.kind,
            }));
        }
        Ok(pivot)
    }
}

/// `relation(2186646)`
fn pivot_set(pivot: Pivot) -> String {
    format!("{}({})", pivot.kind.keyword(), pivot.id)
}

fn drain_kind(pivot: SetKind) -> SetKind {
    if pivot == SetKind::Node {
        SetKind::Way
    } else {
        SetKind::Node
    }
}

fn wrap(lines: Vec<String>, sentinel: &str, guard: &str) -> Vec<String> {
    if lines.is_empty() {
        return lines;
    }
    vec![foreach_block(sentinel, guard, &lines)]
}
