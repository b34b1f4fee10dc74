//! The shared OEE calculation. `KpiOee`, `KpiAvailability`, `KpiPerformance`,
//! and `KpiQuality` all delegate here rather than duplicating the
//! scheduling / downtime / performance math.

use crate::error::AppResult;

use super::context::WidgetContext;
use super::helpers;

#[derive(Debug, Clone, Copy, Default)]
pub struct OeeCalc {
    pub oee: f64,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub scheduled_minutes: f64,
    pub downtime_minutes: f64,
}

pub fn compute_oee(ctx: &WidgetContext) -> AppResult<OeeCalc> {
    let mut calc = OeeCalc::default();

    if ctx.data.is_empty() {
        return Ok(calc);
    }

    let salida = ctx.data.iter().filter(|d| d.is_output()).count() as f64;

    // ── Quality ──────────────────────────────────────────────────
    let dual_lines = helpers::lines_with_input_output(ctx.lines_queried, ctx.cache)?;
    calc.quality = if !dual_lines.is_empty() {
        let dual: Vec<_> = ctx.data.iter().filter(|d| dual_lines.contains(&d.line_id)).collect();
        let entrada = dual.iter().filter(|d| d.is_input()).count() as f64;
        let salida_q = dual.iter().filter(|d| d.is_output()).count() as f64;
        if entrada > 0.0 {
            (salida_q / entrada * 100.0).min(100.0).round_to(1)
        } else {
            100.0
        }
    } else {
        100.0
    };

    // ── Availability ─────────────────────────────────────────────
    calc.scheduled_minutes = helpers::calculate_scheduled_minutes(ctx.params, ctx.cache)?;
    calc.downtime_minutes = helpers::downtime_minutes(ctx.downtime, None);

    if calc.scheduled_minutes > 0.0 {
        calc.availability = (((calc.scheduled_minutes - calc.downtime_minutes) / calc.scheduled_minutes) * 100.0)
            .clamp(0.0, 100.0)
            .round_to(1);
    }

    // ── Performance ──────────────────────────────────────────────
    let operating_minutes = (calc.scheduled_minutes - calc.downtime_minutes).max(0.0);
    if operating_minutes > 0.0 {
        let mut total_expected = 0.0;
        for &line_id in ctx.lines_queried {
            let Some(line) = ctx.cache.get_production_line(line_id)? else {
                continue;
            };
            if line.performance <= 0.0 {
                continue;
            }
            let line_dt_min = helpers::downtime_minutes(ctx.downtime, Some(line_id));
            let line_op_min = (calc.scheduled_minutes - line_dt_min).max(0.0);
            total_expected += line.performance * line_op_min;
        }
        if total_expected > 0.0 {
            calc.performance = (salida / total_expected * 100.0).min(100.0).round_to(1);
        }
    }

    // ── OEE ──────────────────────────────────────────────────────
    if calc.availability > 0.0 && calc.performance > 0.0 && calc.quality > 0.0 {
        calc.oee = (calc.availability / 100.0 * (calc.performance / 100.0) * (calc.quality / 100.0) * 100.0).round_to(1);
    }

    calc.scheduled_minutes = calc.scheduled_minutes.round_to(1);
    calc.downtime_minutes = calc.downtime_minutes.round_to(1);

    Ok(calc)
}

trait RoundTo {
    fn round_to(self, places: u32) -> f64;
}

impl RoundTo for f64 {
    fn round_to(self, places: u32) -> f64 {
        let factor = 10f64.powi(places as i32);
        (self * factor).round() / factor
    }
}
