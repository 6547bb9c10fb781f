//! Builtin function registry.
//!
//! Registers all 35 builtin functions, each under one of three call shapes:
//! element-wise (`f64 -> f64` per element), reducing (window -> scalar) and
//! transforming (whole vector -> whole vector). The registry is built once
//! and never mutated.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vexpr_lexer::FunctionTable;
use vexpr_types::{ArithmeticFault, EvalResult, Vector};

use crate::classify::{self, check, check_nonvanishing, FloatResult};
use crate::stats;

// ─────────────────────────────────────────────────────────────────────
// Call context
// ─────────────────────────────────────────────────────────────────────

/// Per-evaluation state handed to transforming functions.
pub struct CallContext {
    seed: Option<u64>,
    rng: Option<StdRng>,
}

impl CallContext {
    /// Create a context. `seed` fixes the sequence drawn by `random`.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed, rng: None }
    }

    /// The random-number generator, created on first use.
    pub fn rng(&mut self) -> &mut StdRng {
        let seed = self.seed;
        self.rng.get_or_insert_with(|| match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────
// Descriptors
// ─────────────────────────────────────────────────────────────────────

/// How a builtin consumes its argument.
#[derive(Clone, Copy)]
pub enum FunctionKind {
    /// Applied to every element in place.
    ElementWise(fn(f64) -> FloatResult),
    /// Computes one scalar from the whole active window. With
    /// `nonvanishing`, a zero result from all non-zero finite elements is
    /// an underflow.
    Reducing {
        reduce: fn(&[f64]) -> f64,
        nonvanishing: bool,
    },
    /// Replaces the whole vector.
    Transforming(fn(Vector, &mut CallContext) -> EvalResult<Vector>),
}

impl FunctionKind {
    /// Human-readable shape name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ElementWise(_) => "element-wise",
            Self::Reducing { .. } => "reducing",
            Self::Transforming(_) => "transforming",
        }
    }
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A registered builtin.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub kind: FunctionKind,
}

impl FunctionDescriptor {
    /// Call the builtin on its single argument.
    ///
    /// Element-wise functions stop at the first element that fails
    /// classification; the partially mutated argument is dropped.
    pub fn invoke(&self, mut arg: Vector, ctx: &mut CallContext) -> EvalResult<Vector> {
        log::debug!("calling {} ({}) on {} elements", self.name, self.kind.name(), arg.len());
        match self.kind {
            FunctionKind::ElementWise(f) => {
                for x in arg.active_mut() {
                    *x = f(*x)?;
                }
                Ok(arg)
            }
            FunctionKind::Reducing {
                reduce,
                nonvanishing,
            } => {
                let values = arg.active();
                let finite = values.iter().all(|x| x.is_finite());
                let result = reduce(values);
                let value = if nonvanishing {
                    let all_nonzero = values.iter().all(|&x| x != 0.0);
                    check_nonvanishing(result, all_nonzero && finite, finite)?
                } else {
                    check(result, finite)?
                };
                Ok(Vector::scalar(value))
            }
            FunctionKind::Transforming(f) => f(arg, ctx),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────

/// Registry mapping function name → descriptor. Names are case-sensitive.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, FunctionDescriptor>,
}

impl FunctionRegistry {
    /// Create a registry with every builtin.
    pub fn new() -> Self {
        let mut reg = Self {
            functions: HashMap::new(),
        };
        reg.register_element_wise();
        reg.register_reducing();
        reg.register_transforming();
        reg
    }

    /// The shared registry, built on first use.
    pub fn global() -> &'static FunctionRegistry {
        static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FunctionRegistry::new)
    }

    /// Look up a builtin by name.
    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    /// Check if a builtin exists.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All builtin names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of builtins.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no builtins are registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn add(&mut self, name: &'static str, kind: FunctionKind) {
        self.functions.insert(name, FunctionDescriptor { name, kind });
    }

    // ══════════════════════════════════════════════════════════════════
    // Registration
    // ══════════════════════════════════════════════════════════════════

    /// 17 element-wise functions.
    fn register_element_wise(&mut self) {
        use FunctionKind::ElementWise;
        self.add("abs", ElementWise(|x| classify::unary(f64::abs, x)));
        self.add("acos", ElementWise(|x| classify::unary(f64::acos, x)));
        self.add("asin", ElementWise(|x| classify::unary(f64::asin, x)));
        self.add("atan", ElementWise(|x| classify::unary(f64::atan, x)));
        self.add("ceil", ElementWise(|x| classify::unary(f64::ceil, x)));
        self.add("cos", ElementWise(|x| classify::unary(f64::cos, x)));
        self.add("cosh", ElementWise(|x| classify::unary(f64::cosh, x)));
        self.add("exp", ElementWise(|x| check_nonvanishing(x.exp(), x.is_finite(), x.is_finite())));
        self.add("floor", ElementWise(|x| classify::unary(f64::floor, x)));
        self.add("log", ElementWise(|x| classify::unary(f64::ln, x)));
        self.add("log10", ElementWise(|x| classify::unary(f64::log10, x)));
        self.add("round", ElementWise(|x| classify::unary(f64::round, x)));
        self.add("sin", ElementWise(|x| classify::unary(f64::sin, x)));
        self.add("sinh", ElementWise(|x| classify::unary(f64::sinh, x)));
        self.add("sqrt", ElementWise(|x| classify::unary(f64::sqrt, x)));
        self.add("tan", ElementWise(|x| classify::unary(f64::tan, x)));
        self.add("tanh", ElementWise(|x| classify::unary(f64::tanh, x)));
    }

    /// 15 reducing functions.
    fn register_reducing(&mut self) {
        self.add("adev", reducing(stats::avg_deviation));
        self.add("kurtosis", reducing(stats::kurtosis));
        self.add("length", reducing(stats::length));
        self.add("max", reducing(stats::max));
        self.add("mean", reducing(stats::mean));
        self.add("median", reducing(stats::median));
        self.add("min", reducing(stats::min));
        self.add("nz", reducing(stats::zero_count));
        // A product of non-zero factors is never zero.
        self.add(
            "prod",
            FunctionKind::Reducing {
                reduce: stats::product,
                nonvanishing: true,
            },
        );
        self.add("q1", reducing(stats::q1));
        self.add("q3", reducing(stats::q3));
        self.add("sdev", reducing(stats::std_dev));
        self.add("skew", reducing(stats::skew));
        self.add("sum", reducing(stats::sum));
        self.add("var", reducing(stats::variance));
    }

    /// 3 transforming functions.
    fn register_transforming(&mut self) {
        use FunctionKind::Transforming;
        self.add("norm", Transforming(normalize));
        self.add("random", Transforming(randomize));
        self.add("sort", Transforming(sort));
    }
}

fn reducing(reduce: fn(&[f64]) -> f64) -> FunctionKind {
    FunctionKind::Reducing {
        reduce,
        nonvanishing: false,
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionTable for FunctionRegistry {
    fn is_function(&self, name: &str) -> bool {
        self.contains(name)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Transforming functions
// ─────────────────────────────────────────────────────────────────────

/// Ascending sort of the active window, through an index permutation.
fn sort(arg: Vector, _ctx: &mut CallContext) -> EvalResult<Vector> {
    let values = arg.active();
    let sorted = stats::sorted_indices(values)
        .into_iter()
        .map(|i| values[i])
        .collect();
    Ok(sorted)
}

/// Rescale the active window into `[0, 1]`.
fn normalize(mut arg: Vector, _ctx: &mut CallContext) -> EvalResult<Vector> {
    if arg.is_empty() {
        return Ok(arg);
    }
    let min = stats::min(arg.active());
    let max = stats::max(arg.active());
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return Err(ArithmeticFault::Domain.into());
    }
    for x in arg.active_mut() {
        *x = check((*x - min) / range, true)?;
    }
    Ok(arg)
}

/// Replace every element with a uniform draw from `[0, 1)`.
fn randomize(mut arg: Vector, ctx: &mut CallContext) -> EvalResult<Vector> {
    let rng = ctx.rng();
    for x in arg.active_mut() {
        *x = rng.gen::<f64>();
    }
    Ok(arg)
}
