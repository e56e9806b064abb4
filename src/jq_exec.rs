//! jq pre-processing for CLI inputs: one expression, compiled once, fanned out
//! over every loaded document.
use anyhow::{anyhow, Context, Result};
use jaq_core::{load, Compiler, Ctx, Native, RcIter};
use jaq_json::Val;
use serde_json::Value;

pub struct JqFilter {
    src: String,
    filter: jaq_core::Filter<Native<Val>>,
}

impl std::fmt::Debug for JqFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JqFilter").field("src", &self.src).finish_non_exhaustive()
    }
}

impl JqFilter {
    pub fn compile(src: &str) -> Result<Self> {
        let arena = load::Arena::default();
        let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let modules = loader
            .load(&arena, load::File { code: src, path: () })
            .map_err(|errs| {
                collect_errors(src, errs.into_iter().map(|(_, e)| format!("syntax: {e:?}")))
            })?;
        let filter = Compiler::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(|errs| {
                let undefined = errs.into_iter().flat_map(|(_, names)| names);
                collect_errors(src, undefined.map(|(name, u)| format!("undefined {name}: {u:?}")))
            })?;
        tracing::debug!(expr = src, "compiled jq expression");
        Ok(Self { src: src.to_string(), filter })
    }

    /// Every output the expression yields for `input`, in order. An empty
    /// vector means the expression selected nothing.
    pub fn apply(&self, input: &Value) -> Result<Vec<Value>> {
        let inputs = RcIter::new(core::iter::empty());
        self.filter
            .run((Ctx::new([], &inputs), Val::from(input.clone())))
            .map(|item| {
                let val = item.map_err(|e| anyhow!("jq `{}` failed: {e:?}", self.src))?;
                to_json(&val)
            })
            .collect()
    }
}

fn to_json(val: &Val) -> Result<Value> {
    // Val renders as JSON text
    let text = val.to_string();
    serde_json::from_str(&text).with_context(|| format!("jq produced non-JSON output: {text}"))
}

fn collect_errors(src: &str, problems: impl Iterator<Item = String>) -> anyhow::Error {
    let problems: Vec<String> = problems.collect();
    anyhow!("invalid jq expression `{src}`:\n  {}", problems.join("\n  "))
}
