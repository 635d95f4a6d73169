// src/services/scoring.rs
use crate::models::{SecurityRecord, StockScores};

/// Dividend quality: yield (up to 40), payout ratio (up to 30) and length of
/// the growth streak (up to 30).
fn dividend_score(stock: &SecurityRecord) -> f64 {
    let mut score = 0.0;
    if stock.dividend_yield >= 0.04 {
        score += (stock.dividend_yield / 0.06 * 40.0).min(40.0);
    }

    if stock.payout_ratio < 0.6 {
        score += 30.0;
    } else if stock.payout_ratio < 0.8 {
        score += 15.0;
    }

    // 25+ years is aristocrat territory
    score += match stock.consecutive_years {
        y if y >= 25 => 30.0,
        y if y >= 10 => 15.0,
        _ => 5.0,
    };
    score
}

fn fundamentals_score(stock: &SecurityRecord) -> f64 {
    let mut score = 0.0;
    if stock.pe_ratio < 15.0 {
        score += 35.0;
    } else if stock.pe_ratio < 25.0 {
        score += 20.0;
    }

    if stock.roe >= 0.15 {
        score += 35.0;
    } else if stock.roe >= 0.10 {
        score += 20.0;
    }

    if stock.debt_to_equity < 1.0 {
        score += 30.0;
    } else if stock.debt_to_equity < 2.0 {
        score += 15.0;
    }
    score
}

pub fn calculate_scores(stock: &SecurityRecord) -> StockScores {
    let dividend = dividend_score(stock);
    let fundamentals = fundamentals_score(stock);

    StockScores {
        overall: (dividend * 0.6 + fundamentals * 0.4).round() as u32,
        dividend: dividend.round() as u32,
        fundamentals: fundamentals.round() as u32,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredSecurity<'a> {
    pub record: &'a SecurityRecord,
    pub scores: StockScores,
}

/// Best overall score first; ties keep snapshot order.
pub fn rank_by_score(records: &[SecurityRecord]) -> Vec<ScoredSecurity<'_>> {
    let mut ranked: Vec<ScoredSecurity> = records
        .iter()
        .map(|record| ScoredSecurity { record, scores: calculate_scores(record) })
        .collect();
    ranked.sort_by(|a, b| b.scores.overall.cmp(&a.scores.overall));
    ranked
}
