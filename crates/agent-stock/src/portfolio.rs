//! Holdings CSV loaded from the local filesystem
//!
//! The file has a fixed header `symbol,average_cost,quantity` (case and
//! spacing are ignored) followed by any number of rows. The same file is
//! uploaded to the agent for code-interpreter analysis; locally it is parsed
//! to validate it before any remote call.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const COLUMNS: [&str; 3] = ["symbol", "average_cost", "quantity"];

/// One position in the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub average_cost: f64,
    pub quantity: f64,
}

impl Holding {
    /// Total amount paid for the position
    pub fn cost_basis(&self) -> f64 {
        self.average_cost * self.quantity
    }
}

/// Parsed portfolio file
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    path: PathBuf,
    holdings: Vec<Holding>,
}

impl Portfolio {
    /// Read and validate a portfolio file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StockError::PortfolioIo {
            path: path.to_path_buf(),
            source,
        })?;

        let portfolio = Self::parse(path, &content)?;
        debug!(
            path = %path.display(),
            holdings = portfolio.holdings.len(),
            "Loaded portfolio"
        );
        Ok(portfolio)
    }

    /// Parse portfolio CSV content; `path` is only used in error messages
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format_error = |line: usize, reason: String| StockError::PortfolioFormat {
            path: path.clone(),
            line,
            reason,
        };

        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (header_line, header) = lines
            .next()
            .ok_or_else(|| format_error(1, "file is empty".to_string()))?;

        let columns: Vec<String> = header
            .trim_start_matches('\u{feff}')
            .split(',')
            .map(|c| c.trim().to_lowercase().replace(' ', "_"))
            .collect();
        if columns != COLUMNS {
            return Err(format_error(
                header_line,
                format!("expected header '{}', got '{header}'", COLUMNS.join(",")),
            ));
        }

        let mut holdings = Vec::new();
        for (line, row) in lines {
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            let [symbol, average_cost, quantity] = fields.as_slice() else {
                return Err(format_error(
                    line,
                    format!("expected {} columns, got {}", COLUMNS.len(), fields.len()),
                ));
            };

            if symbol.is_empty() {
                return Err(format_error(line, "symbol is empty".to_string()));
            }
            let parse_number = |name: &str, raw: &str| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format_error(line, format!("{name} '{raw}' is not a number")))
            };

            holdings.push(Holding {
                symbol: symbol.to_uppercase(),
                average_cost: parse_number("average_cost", *average_cost)?,
                quantity: parse_number("quantity", *quantity)?,
            });
        }

        Ok(Self { path, holdings })
    }

    /// Where the portfolio was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Symbols held, in file order
    pub fn symbols(&self) -> Vec<&str> {
        self.holdings.iter().map(|h| h.symbol.as_str()).collect()
    }

    /// Sum of all cost bases
    pub fn total_cost_basis(&self) -> f64 {
        self.holdings.iter().map(Holding::cost_basis).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
