//! # Symbol Scan
//!
//! Heuristic extraction of variable-like symbols from free-text formulas,
//! and a consistency report against an equation's declared variables.
//!
//! Formulas in the catalog are pseudo-LaTeX and are not parsed as
//! mathematics. The scan only tokenizes:
//!
//! - identifiers start with a letter (Unicode letters included, so `Ψ`
//!   and `ℏ` count) and continue with letters, digits or `_`
//! - LaTeX commands (`\frac`, `\sum`, ...) are dropped, except Greek
//!   letters and a few symbol commands (`\omega` becomes `omega`)
//! - common function words (`sin`, `log`, `sqrt`, ...) are dropped
//!
//! ```rust
//! use codex_core::symbols::extract_symbols;
//!
//! let found = extract_symbols(r"E_r = \hbar \omega + \frac{1}{2} k x^2");
//! assert_eq!(found, vec!["E_r", "hbar", "omega", "k", "x"]);
//! ```

use serde::{Deserialize, Serialize};

use crate::equation::Equation;

/// LaTeX commands that name a quantity rather than an operator.
const SYMBOL_COMMANDS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau",
    "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda",
    "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega", "hbar", "ell",
];

/// Plain words treated as functions, not symbols.
const FUNCTION_WORDS: &[&str] = &[
    "sin", "cos", "tan", "exp", "log", "ln", "sqrt", "lim", "max", "min", "det", "tr",
];

/// Extract symbol names from a formula, deduplicated in first-seen order.
pub fn extract_symbols(formula: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    let mut chars = formula.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            let mut command = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphabetic() {
                    command.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if SYMBOL_COMMANDS.contains(&command.as_str()) {
                push_unique(&mut symbols, command);
            }
        } else if c.is_alphabetic() {
            let mut token = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    token.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            // "E_{r}" tokenizes as "E_" followed by "r"
            let token = token.trim_end_matches('_').to_string();
            if !FUNCTION_WORDS.contains(&token.as_str()) {
                push_unique(&mut symbols, token);
            }
        }
    }

    symbols
}

fn push_unique(symbols: &mut Vec<String>, token: String) {
    if !token.is_empty() && !symbols.contains(&token) {
        symbols.push(token);
    }
}

/// Result of comparing a formula's symbols with its declared variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub id: String,
    /// Symbols found in the formula
    pub found: Vec<String>,
    /// Found in the formula but not declared
    pub undeclared: Vec<String>,
    /// Declared but not found in the formula
    pub unused: Vec<String>,
}

impl SymbolReport {
    pub fn is_consistent(&self) -> bool {
        self.undeclared.is_empty() && self.unused.is_empty()
    }
}

/// Scan one equation.
pub fn scan(equation: &Equation) -> SymbolReport {
    let found = extract_symbols(&equation.formula);

    let undeclared = found
        .iter()
        .filter(|s| !equation.variables.contains(*s))
        .cloned()
        .collect();

    let unused = equation
        .variables
        .iter()
        .filter(|v| !found.contains(*v))
        .cloned()
        .collect();

    SymbolReport {
        id: equation.id.clone(),
        found,
        undeclared,
        unused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_formula() {
        assert_eq!(extract_symbols("F = m * a"), vec!["F", "m", "a"]);
    }

    #[test]
    fn test_latex_commands_dropped_greek_kept() {
        let found = extract_symbols(r"\Psi = \sum_{n} \frac{\alpha_n}{\sqrt{2}}");
        assert_eq!(found, vec!["Psi", "n", "alpha"]);
    }

    #[test]
    fn test_function_words_dropped() {
        let found = extract_symbols("y = A sin(omega t) + log(x)");
        assert_eq!(found, vec!["y", "A", "omega", "t", "x"]);
    }

    #[test]
    fn test_unicode_letters_and_dedup() {
        let found = extract_symbols("Ψ = ℏ ω + ℏ ω Ψ");
        assert_eq!(found, vec!["Ψ", "ℏ", "ω"]);
    }

    #[test]
    fn test_braced_subscript_splits() {
        assert_eq!(extract_symbols("E_{r} = h f"), vec!["E", "r", "h", "f"]);
    }

    #[test]
    fn test_empty_formula() {
        assert!(extract_symbols("").is_empty());
        assert!(extract_symbols("1 + 2 = 3").is_empty());
    }

    #[test]
    fn test_scan_reports_mismatches() {
        let eq = Equation::new("EQ1", "Teste", "E = m c^2").with_variables(["E", "m", "v"]);
        let report = scan(&eq);

        assert_eq!(report.found, vec!["E", "m", "c"]);
        assert_eq!(report.undeclared, vec!["c"]);
        assert_eq!(report.unused, vec!["v"]);
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_scan_consistent() {
        let eq = Equation::new("EQ2", "Teste", r"E = \hbar \omega").with_variables(["E", "hbar", "omega"]);
        assert!(scan(&eq).is_consistent());
    }
}
