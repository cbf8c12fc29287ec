//! Shape-preserving rate curve over sparse `(period, rate)` points.
//!
//! The curve is a piecewise cubic Hermite interpolant (PCHIP). Knot slopes are the
//! weighted harmonic mean of the neighbouring secants (Fritsch-Butland), set to zero at
//! local extrema, so the curve never overshoots the data between knots. End slopes use the
//! one-sided three-point formula, clipped to keep the end intervals monotone.

use std::io::Write;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AmortizationError, Result};

/// Upper bound on the number of samples a single range query may produce.
pub const MAX_SAMPLES: usize = 100_000;

/// A sampled point of the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub period: Decimal,
    pub rate_decimal: Decimal,
    pub rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateCurve {
    periods: Vec<Decimal>,
    rates: Vec<Decimal>,
    slopes: Vec<Decimal>,
}

impl RateCurve {
    /// Builds a curve through the known points.
    ///
    /// Points may come in any order; they are sorted by period. Rates are taken as
    /// percentages when any of them exceeds 1 in magnitude, and as decimal fractions
    /// otherwise.
    pub fn new(periods: &[Decimal], rates: &[Decimal]) -> Result<Self> {
        if periods.len() != rates.len() {
            return Err(AmortizationError::InvalidCurve(format!(
                "got {} periods but {} rates",
                periods.len(),
                rates.len()
            )));
        }
        if periods.len() < 2 {
            return Err(AmortizationError::InvalidCurve(
                "need at least 2 known points".into(),
            ));
        }

        let mut points: Vec<(Decimal, Decimal)> =
            periods.iter().copied().zip(rates.iter().copied()).collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(w) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(AmortizationError::InvalidCurve(format!(
                "duplicate period {}",
                w[0].0
            )));
        }

        let as_percent = points.iter().any(|(_, r)| r.abs() > Decimal::ONE);
        let periods: Vec<Decimal> = points.iter().map(|(p, _)| *p).collect();
        let rates: Vec<Decimal> = points
            .iter()
            .map(|(_, r)| if as_percent { *r / dec!(100) } else { *r })
            .collect();
        let slopes = pchip_slopes(&periods, &rates).ok_or_else(|| {
            AmortizationError::InvalidCurve("known points are too far apart to fit".into())
        })?;

        debug!(knots = periods.len(), as_percent, "built rate curve");
        Ok(Self { periods, rates, slopes })
    }

    pub fn min_period(&self) -> Decimal {
        self.periods[0]
    }

    pub fn max_period(&self) -> Decimal {
        self.periods[self.periods.len() - 1]
    }

    /// Rate at `period`, as a decimal fraction. Outside the known range the cubic of
    /// the nearest end interval is extended.
    ///
    /// # Errors
    ///
    /// Returns [`AmortizationError::Overflow`] when `period` lies so far outside the known
    /// range that the extended cubic no longer fits in a `Decimal`.
    pub fn rate_at(&self, period: Decimal) -> Result<Decimal> {
        let last = self.periods.len() - 1;
        // index of the knot starting the interval that holds `period`
        let lo = self
            .periods
            .partition_point(|p| *p <= period)
            .saturating_sub(1)
            .min(last - 1);
        let hi = lo + 1;

        let (x0, x1) = (self.periods[lo], self.periods[hi]);
        x1.checked_sub(x0)
            .zip(period.checked_sub(x0))
            .and_then(|(h, offset)| Some((h, offset.checked_div(h)?)))
            .and_then(|(h, t)| {
                hermite(
                    t,
                    h,
                    (self.rates[lo], self.slopes[lo]),
                    (self.rates[hi], self.slopes[hi]),
                )
            })
            .ok_or(AmortizationError::Overflow("rate curve"))
    }
}

/// Cubic Hermite value at `t` on an interval of width `h`, given `(value, slope)` at
/// both ends. `None` on overflow.
fn hermite(
    t: Decimal,
    h: Decimal,
    (y0, m0): (Decimal, Decimal),
    (y1, m1): (Decimal, Decimal),
) -> Option<Decimal> {
    let one = Decimal::ONE;
    let two = dec!(2);
    let three = dec!(3);

    let s = one.checked_sub(t)?;
    let s2 = s.checked_mul(s)?;
    let t2 = t.checked_mul(t)?;
    let two_t = two.checked_mul(t)?;

    let h00 = one.checked_add(two_t)?.checked_mul(s2)?;
    let h10 = t.checked_mul(s2)?;
    let h01 = t2.checked_mul(three.checked_sub(two_t)?)?;
    let h11 = t2.checked_mul(t.checked_sub(one)?)?;

    h00.checked_mul(y0)?
        .checked_add(h10.checked_mul(h)?.checked_mul(m0)?)?
        .checked_add(h01.checked_mul(y1)?)?
        .checked_add(h11.checked_mul(h)?.checked_mul(m1)?)
}

fn sign(x: Decimal) -> i8 {
    if x.is_zero() {
        0
    } else if x.is_sign_negative() {
        -1
    } else {
        1
    }
}

fn pchip_slopes(xs: &[Decimal], ys: &[Decimal]) -> Option<Vec<Decimal>> {
    let n = xs.len();
    let h = xs
        .windows(2)
        .map(|w| w[1].checked_sub(w[0]))
        .collect::<Option<Vec<Decimal>>>()?;
    let delta = (0..n - 1)
        .map(|i| ys[i + 1].checked_sub(ys[i])?.checked_div(h[i]))
        .collect::<Option<Vec<Decimal>>>()?;

    if n == 2 {
        return Some(vec![delta[0], delta[0]]);
    }

    let mut slopes = vec![Decimal::ZERO; n];
    for k in 1..n - 1 {
        let (d0, d1) = (delta[k - 1], delta[k]);
        if sign(d0) == 0 || sign(d1) == 0 || sign(d0) != sign(d1) {
            continue;
        }
        let w1 = dec!(2).checked_mul(h[k])?.checked_add(h[k - 1])?;
        let w2 = dec!(2).checked_mul(h[k - 1])?.checked_add(h[k])?;
        let denom = w1.checked_div(d0)?.checked_add(w2.checked_div(d1)?)?;
        slopes[k] = w1.checked_add(w2)?.checked_div(denom)?;
    }

    slopes[0] = end_slope(h[0], h[1], delta[0], delta[1])?;
    slopes[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3])?;
    Some(slopes)
}

fn end_slope(h0: Decimal, h1: Decimal, d0: Decimal, d1: Decimal) -> Option<Decimal> {
    let lead = dec!(2).checked_mul(h0)?.checked_add(h1)?.checked_mul(d0)?;
    let m = lead
        .checked_sub(h0.checked_mul(d1)?)?
        .checked_div(h0.checked_add(h1)?)?;
    let slope = if sign(m) != sign(d0) {
        Decimal::ZERO
    } else if sign(d0) != sign(d1) && m.abs() > dec!(3) * d0.abs() {
        dec!(3) * d0
    } else {
        m
    };
    Some(slope)
}

/// Samples the curve at `start, start + step, ...` up to and including `end`.
pub fn interpolate_range(
    curve: &RateCurve,
    start: Decimal,
    end: Decimal,
    step: Decimal,
) -> Result<Vec<RatePoint>> {
    if step <= Decimal::ZERO {
        return Err(AmortizationError::InvalidCurve(format!(
            "step must be > 0 (got {step})"
        )));
    }
    if end < start {
        return Err(AmortizationError::InvalidCurve(format!(
            "end period {end} is before start period {start}"
        )));
    }

    let mut points = Vec::new();
    let mut period = start;
    while period <= end {
        if points.len() == MAX_SAMPLES {
            return Err(AmortizationError::InvalidCurve(format!(
                "range would produce more than {MAX_SAMPLES} samples"
            )));
        }
        let rate = curve.rate_at(period)?;
        let rate_percent = rate
            .checked_mul(dec!(100))
            .ok_or(AmortizationError::Overflow("rate curve"))?;
        points.push(RatePoint {
            period,
            rate_decimal: rate.normalize(),
            rate_percent: rate_percent.normalize(),
        });
        period = match period.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(points)
}

/// Writes sampled points as CSV with header `period,rate_decimal,rate_percent`.
pub fn write_rates_csv<W: Write>(writer: W, points: &[RatePoint]) -> Result<()> {
    let mut wrt = csv::Writer::from_writer(writer);
    for point in points {
        wrt.serialize(point)?;
    }
    wrt.flush()?;
    Ok(())
}
