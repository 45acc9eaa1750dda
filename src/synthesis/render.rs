//! RunResult 的 Markdown 渲染（CLI 默认输出）

use std::fmt::Write;

use crate::core::{ArtifactPayload, BudgetPlan, CreativeSuggestion, ItineraryPlan, SafetyVerdict, WeatherOutlook};
use crate::synthesis::{RunResult, Section, SectionStatus};

pub fn render_markdown(result: &RunResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Hive {} run `{}`\n", result.mode, result.run_id);
    let _ = writeln!(
        out,
        "**Overall:** {}  |  **Risk:** {}",
        result.overall_status, result.verdict.classification
    );
    if let Some(caveat) = &result.verdict.caveat {
        let _ = writeln!(out, "\n> {caveat}");
    }

    let h = &result.highlights;
    if !h.digest.is_empty() || !h.kits.is_empty() || !h.conflicts.is_empty() {
        out.push_str("\n## Highlights\n\n");
        for line in &h.digest {
            let _ = writeln!(out, "- {line}");
        }
        for kit in &h.kits {
            let parts: Vec<&str> = [kit.theme.as_deref(), kit.menu.as_deref(), kit.activity.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            let _ = writeln!(out, "- **{}**: {}", kit.title, parts.join(" + "));
        }
        for conflict in &h.conflicts {
            let _ = writeln!(out, "- Dietary conflict: {conflict}");
        }
    }

    for section in &result.sections {
        render_section(&mut out, section);
    }

    if !result.failures.is_empty() {
        out.push_str("\n## Failures\n\n");
        for f in &result.failures {
            let _ = writeln!(out, "- `{}` ({}): {}", f.stage, f.kind, f.detail);
        }
    }
    out
}

fn render_section(out: &mut String, section: &Section) {
    let marker = match section.status {
        SectionStatus::Ok => "",
        SectionStatus::Degraded => " _(degraded)_",
        SectionStatus::Unavailable => " _(unavailable)_",
    };
    let _ = writeln!(out, "\n## {}{marker}\n", section.title);
    for caveat in &section.caveats {
        let _ = writeln!(out, "> {caveat}");
    }
    if !section.caveats.is_empty() {
        out.push('\n');
    }
    if let Some(notice) = &section.notice {
        let _ = writeln!(out, "{notice}");
    }

    match &section.content {
        Some(ArtifactPayload::WeatherOutlook(w)) => weather(out, w),
        Some(ArtifactPayload::SafetyVerdict(v)) => safety(out, v),
        Some(ArtifactPayload::ItineraryPlan(p)) => itinerary(out, p),
        Some(ArtifactPayload::CreativeSuggestion(c)) => ideas(out, c),
        Some(ArtifactPayload::BudgetPlan(b)) => budget(out, b),
        None => {}
    }
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    value.map(|v| format!("{v:.0}{unit}")).unwrap_or_else(|| "n/a".to_string())
}

fn weather(out: &mut String, w: &WeatherOutlook) {
    let _ = writeln!(out, "Location: {} (source: {})\n", w.location, w.source);
    if !w.daily.is_empty() {
        out.push_str("| Date | Max | Min | Rain | Wind |\n|---|---|---|---|---|\n");
        for d in &w.daily {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                d.date,
                fmt_opt(d.max_temp_c, "°C"),
                fmt_opt(d.min_temp_c, "°C"),
                fmt_opt(d.precip_probability, "%"),
                fmt_opt(d.wind_speed_max_kmh, " km/h"),
            );
        }
        out.push('\n');
    }
    for alert in &w.alerts {
        let _ = writeln!(out, "- Alert {}: {}", alert.date, alert.detail);
    }
    if !w.packing.is_empty() {
        let _ = writeln!(out, "- Packing: {}", w.packing.join(", "));
    }
}

fn safety(out: &mut String, v: &SafetyVerdict) {
    let _ = writeln!(out, "Classification: **{}** ({})\n", v.classification, v.source);
    for finding in &v.findings {
        let _ = writeln!(
            out,
            "- [{}] {} ({})",
            finding.severity,
            finding.headline.title,
            finding.signals.join(", ")
        );
    }
    for action in &v.actions {
        let _ = writeln!(out, "- Action: {action}");
    }
}

fn list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "**{heading}**\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}

fn itinerary(out: &mut String, p: &ItineraryPlan) {
    let _ = writeln!(out, "Trip length: {:?}\n", p.trip_length);
    list(out, "Before departure", &p.before_departure);
    list(out, "During the trip", &p.during_trip);
    list(out, "After return", &p.after_return);
    list(out, "Packing", &p.packing);
    list(out, "Contingencies", &p.contingencies);
    if let Some(notes) = &p.notes {
        let _ = writeln!(out, "{notes}");
    }
}

fn ideas(out: &mut String, c: &CreativeSuggestion) {
    for idea in &c.ideas {
        let _ = writeln!(out, "### {}\n", idea.title);
        for detail in &idea.details {
            let _ = writeln!(out, "- {detail}");
        }
        out.push('\n');
    }
}

fn budget(out: &mut String, b: &BudgetPlan) {
    let _ = writeln!(
        out,
        "Total {:.0} {} for {} guests ({:.0} per guest)\n",
        b.total, b.currency, b.guests, b.per_guest
    );
    for line in &b.lines {
        let _ = writeln!(out, "- {}: {:.0} {}", line.label, line.amount, b.currency);
    }
    list(out, "Tips", &b.tips);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{
        ArtifactFamily, FailureKind, Request, RequestMode, SharedContext, StageInfo,
    };
    use crate::specialists::catalog;
    use crate::synthesis::Synthesizer;

    #[test]
    fn test_render_marks_degraded_and_unavailable() {
        let stages = vec![
            StageInfo::new("theme_designer", ArtifactFamily::Theme),
            StageInfo::new("menu_mixologist", ArtifactFamily::Menu),
            StageInfo::new("budget_planner", ArtifactFamily::Budget),
        ];
        let ctx = SharedContext::new(Arc::new(Request::new("party")));
        ctx.record(stages[0].degraded(
            ArtifactPayload::CreativeSuggestion(CreativeSuggestion { ideas: catalog::themes() }),
            vec!["catalog picks".into()],
        ))
        .unwrap();
        ctx.record(stages[1].failed(FailureKind::Timeout, "run timeout")).unwrap();

        let result = Synthesizer::new().run(&ctx, &stages, RequestMode::Creative);
        let md = render_markdown(&result);
        assert!(md.contains("## Theme Concepts _(degraded)_"));
        assert!(md.contains("> catalog picks"));
        assert!(md.contains("### Marigold Mela"));
        assert!(md.contains("## Menu Boards _(unavailable)_"));
        assert!(md.contains("- `menu_mixologist` (timeout): run timeout"));
        assert!(md.contains("**Overall:** unavailable"));
    }
}
