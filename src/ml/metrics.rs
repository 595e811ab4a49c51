// ============================================================
// Layer 5 — Classification Metrics
// ============================================================
// Scores the flat prediction sequences gathered over the whole
// test set. Pure Rust, no tensors: by the time metrics run all
// predictions have been pulled back to the CPU.
//
// Precision, recall and F1 are micro-averaged: every class's
// TP/FP/FN are pooled before dividing. For single-label data
// each wrong prediction is one FP and one FN, so all three
// equal accuracy.
//
// ROC AUC (binary):
//   AUC is the probability that a random positive example is
//   scored above a random negative one. With average ranks for
//   tied scores:
//
//     AUC = (Σ rank(pos) - P(P+1)/2) / (P · N)
//
// Reference: Fawcett (2006) An introduction to ROC analysis

use std::fmt;

/// Pooled confusion counts over every class.
#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    tp:  usize,
    fp:  usize,
    fn_: usize,
}

fn confusion(y_true: &[usize], y_pred: &[usize]) -> Counts {
    y_true.iter().zip(y_pred).fold(Counts::default(), |mut c, (t, p)| {
        if t == p {
            c.tp += 1;
        } else {
            // Wrong for the predicted class and missed for the true one
            c.fp  += 1;
            c.fn_ += 1;
        }
        c
    })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Fraction of exact matches.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    ratio(correct, y_true.len().min(y_pred.len()))
}

pub fn precision(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let c = confusion(y_true, y_pred);
    ratio(c.tp, c.tp + c.fp)
}

pub fn recall(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let c = confusion(y_true, y_pred);
    ratio(c.tp, c.tp + c.fn_)
}

pub fn f1(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let (p, r) = (precision(y_true, y_pred), recall(y_true, y_pred));
    if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
}

/// Binary ROC AUC. The larger of the two label values is the
/// positive class. Returns None unless exactly two distinct
/// labels are present.
pub fn roc_auc(y_true: &[usize], y_score: &[f32]) -> Option<f64> {
    let mut labels: Vec<usize> = y_true.to_vec();
    labels.sort_unstable();
    labels.dedup();
    if labels.len() != 2 {
        return None;
    }
    let positive = labels[1];

    // ── Average ranks (1-based), ties share the mean of their span ──────────
    let n = y_true.len().min(y_score.len());
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| y_score[a].total_cmp(&y_score[b]));

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && y_score[order[j + 1]] == y_score[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }

    let n_pos = y_true[..n].iter().filter(|&&t| t == positive).count() as f64;
    let n_neg = n as f64 - n_pos;
    let rank_sum: f64 = (0..n).filter(|&k| y_true[k] == positive).map(|k| ranks[k]).sum();

    Some((rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

// ─── MetricReport ─────────────────────────────────────────────────────────────
/// Aggregate numbers for one full pass over the test set.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub loss:      f64,
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    /// None when AUC is undefined (a single class in the labels)
    pub auc:       Option<f64>,
}

impl MetricReport {
    /// Micro-averaged report; AUC uses each example's top-1 score.
    pub fn compute(loss: f64, labels: &[usize], predicted: &[usize], top1_scores: &[f32]) -> Self {
        Self {
            loss,
            accuracy:  accuracy(labels, predicted),
            precision: precision(labels, predicted),
            recall:    recall(labels, predicted),
            f1:        f1(labels, predicted),
            auc:       roc_auc(labels, top1_scores),
        }
    }
}

impl fmt::Display for MetricReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss {} | Acc {} | Precision {} | Recall {} | F1 {} | AUC ",
            format_g(self.loss),
            format_g(self.accuracy),
            format_g(self.precision),
            format_g(self.recall),
            format_g(self.f1),
        )?;
        match self.auc {
            Some(auc) => write!(f, "{}", format_g(auc)),
            None      => write!(f, "n/a"),
        }
    }
}

/// Shortest form with six significant digits, like C's "%g":
/// trailing zeros dropped, exponent notation outside [1e-4, 1e6).
///
///   0.5 → "0.5"    0.123456789 → "0.123457"    0.0000123 → "1.23e-05"
pub fn format_g(x: f64) -> String {
    if x == 0.0 || !x.is_finite() {
        return x.to_string();
    }
    let exp = x.abs().log10().floor() as i32;
    if (-4..6).contains(&exp) {
        let decimals = (5 - exp).max(0) as usize;
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    } else {
        let sci = format!("{x:.5e}");
        let (mantissa, power) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let power: i32 = power.parse().unwrap_or(0);
        let sign = if power < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, power.abs())
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_micro_scores_equal_accuracy() {
        let t = [0, 1, 1, 0, 1];
        let p = [0, 1, 0, 0, 0];
        assert!(close(accuracy(&t, &p), 0.6));
        assert!(close(precision(&t, &p), 0.6));
        assert!(close(recall(&t, &p), 0.6));
        assert!(close(f1(&t, &p), 0.6));
    }

    #[test]
    fn test_auc_perfect_and_inverted() {
        let t = [0, 0, 1, 1];
        assert!(close(roc_auc(&t, &[0.1, 0.2, 0.8, 0.9]).unwrap(), 1.0));
        assert!(close(roc_auc(&t, &[0.9, 0.8, 0.2, 0.1]).unwrap(), 0.0));
    }

    #[test]
    fn test_auc_with_ties() {
        // Classic example: scores 0.1 0.4 0.35 0.8 → 0.75
        let t = [0, 0, 1, 1];
        assert!(close(roc_auc(&t, &[0.1, 0.4, 0.35, 0.8]).unwrap(), 0.75));
        // Every score tied → chance level
        assert!(close(roc_auc(&t, &[0.5, 0.5, 0.5, 0.5]).unwrap(), 0.5));
    }

    #[test]
    fn test_auc_undefined_for_single_class() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.2, 0.4, 0.9]), None);
    }

    #[test]
    fn test_report_display() {
        let r = MetricReport::compute(0.5, &[1, 1], &[1, 0], &[0.9, 0.6]);
        let line = r.to_string();
        assert_eq!(line, "Loss 0.5 | Acc 0.5 | Precision 0.5 | Recall 0.5 | F1 0.5 | AUC n/a");
    }

    #[test]
    fn test_format_g_matches_printf() {
        assert_eq!(format_g(0.0), "0");
        assert_eq!(format_g(1.0), "1");
        assert_eq!(format_g(0.5), "0.5");
        assert_eq!(format_g(0.123456789), "0.123457");
        assert_eq!(format_g(0.693147180), "0.693147");
        assert_eq!(format_g(12.5), "12.5");
        assert_eq!(format_g(0.0000123), "1.23e-05");
        assert_eq!(format_g(1234567.0), "1.23457e+06");
    }
}
