// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw status text → normalized printer state.
//
// Two ordered rule tables, one per status vocabulary. The first matching
// rule wins, so more specific conditions (offline, jam) sit above generic
// ones (error, printing). Text that matches nothing is reported as Ready
// with `defaulted` set.

use easyprinter_core::types::{PrinterState, StatusFamily};

/// Outcome of classifying one status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub state: PrinterState,
    pub message: &'static str,
    pub online: bool,
    /// No rule matched; `state` is the Ready fallback.
    pub defaulted: bool,
}

/// A rule matches when any of its patterns matches; a pattern matches when
/// every one of its substrings occurs in the lowercased text.
struct Rule {
    patterns: &'static [&'static [&'static str]],
    state: PrinterState,
}

/// Windows `Get-Printer` `PrinterStatus` vocabulary.
const SPOOLER_RULES: &[Rule] = &[
    Rule { patterns: &[&["offline"]], state: PrinterState::Offline },
    Rule { patterns: &[&["paperjam"], &["jam"]], state: PrinterState::PaperJam },
    Rule { patterns: &[&["paperout"], &["paper", "out"]], state: PrinterState::PaperOut },
    Rule { patterns: &[&["toner", "low"]], state: PrinterState::TonerLow },
    Rule { patterns: &[&["error"]], state: PrinterState::Error },
    Rule { patterns: &[&["printing"], &["busy"]], state: PrinterState::Printing },
    Rule { patterns: &[&["warmingup"], &["warming"]], state: PrinterState::Warming },
];

/// CUPS `lpstat -p -l` vocabulary.
const CUPS_RULES: &[Rule] = &[
    Rule { patterns: &[&["disabled"], &["offline"]], state: PrinterState::Offline },
    Rule { patterns: &[&["jam"]], state: PrinterState::PaperJam },
    Rule {
        patterns: &[&["media-empty"], &["media-needed"], &["paper", "out"]],
        state: PrinterState::PaperOut,
    },
    Rule {
        patterns: &[&["toner-low"], &["marker-supply-low"], &["toner", "low"]],
        state: PrinterState::TonerLow,
    },
    Rule { patterns: &[&["error"]], state: PrinterState::Error },
    Rule { patterns: &[&["now printing"], &["printing"]], state: PrinterState::Printing },
    Rule { patterns: &[&["warming"]], state: PrinterState::Warming },
    Rule { patterns: &[&["idle"]], state: PrinterState::Ready },
];

fn rules_for(family: StatusFamily) -> &'static [Rule] {
    match family {
        StatusFamily::Spooler => SPOOLER_RULES,
        StatusFamily::Cups => CUPS_RULES,
    }
}

/// Classify raw status text. Total: any input, including empty, yields a
/// classification.
pub fn classify(raw: &str, family: StatusFamily) -> Classification {
    let text = raw.to_lowercase();
    let matched = rules_for(family).iter().find(|rule| {
        rule.patterns
            .iter()
            .any(|pattern| pattern.iter().all(|needle| text.contains(needle)))
    });

    match matched {
        Some(rule) => Classification {
            state: rule.state,
            message: rule.state.message(),
            online: rule.state != PrinterState::Offline,
            defaulted: false,
        },
        None => Classification {
            state: PrinterState::Ready,
            message: PrinterState::Ready.message(),
            online: true,
            defaulted: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: [StatusFamily; 2] = [StatusFamily::Spooler, StatusFamily::Cups];

    #[test]
    fn jam_outranks_paper_out() {
        for family in BOTH {
            let c = classify("paper jam detected", family);
            assert_eq!(c.state, PrinterState::PaperJam, "{family:?}");
            assert_eq!(c.message, "Замятие бумаги");
            assert!(c.online);
        }
    }

    #[test]
    fn empty_and_garbage_default_to_ready() {
        for family in BOTH {
            for raw in ["", "garbage xyz", "   \n\t"] {
                let c = classify(raw, family);
                assert_eq!(c.state, PrinterState::Ready);
                assert_eq!(c.message, "Готов к работе");
                assert!(c.defaulted);
                assert!(c.online);
            }
        }
    }

    #[test]
    fn spooler_vocabulary() {
        let cases = [
            ("Offline", PrinterState::Offline),
            ("PaperJam", PrinterState::PaperJam),
            ("PaperOut", PrinterState::PaperOut),
            ("TonerLow", PrinterState::TonerLow),
            ("Error", PrinterState::Error),
            ("Printing", PrinterState::Printing),
            ("Busy", PrinterState::Printing),
            ("WarmingUp", PrinterState::Warming),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify(raw, StatusFamily::Spooler).state, expected, "{raw}");
        }
        let normal = classify("Normal", StatusFamily::Spooler);
        assert_eq!(normal.state, PrinterState::Ready);
        assert!(normal.defaulted);
    }

    #[test]
    fn cups_lpstat_output() {
        let idle = "printer HP_LaserJet_M1536dnf is idle.  enabled since Mon 01 Jan 2024\n\
                    \tAlerts: none\n";
        let c = classify(idle, StatusFamily::Cups);
        assert_eq!(c.state, PrinterState::Ready);
        assert!(!c.defaulted);

        let printing = "printer HP now printing HP-42.  enabled since Mon 01 Jan 2024";
        assert_eq!(classify(printing, StatusFamily::Cups).state, PrinterState::Printing);

        let out_of_paper = "printer HP is idle.  enabled since Mon\n\tAlerts: media-empty-error";
        assert_eq!(classify(out_of_paper, StatusFamily::Cups).state, PrinterState::PaperOut);

        let toner = "printer HP is idle.\n\tAlerts: marker-supply-low-warning";
        assert_eq!(classify(toner, StatusFamily::Cups).state, PrinterState::TonerLow);
    }

    #[test]
    fn offline_is_never_online() {
        let disabled = classify("printer HP disabled since Mon - Paused", StatusFamily::Cups);
        assert_eq!(disabled.state, PrinterState::Offline);
        assert!(!disabled.online);
        assert_eq!(disabled.message, "Принтер не в сети");

        let offline = classify("Offline, PaperJam", StatusFamily::Spooler);
        assert_eq!(offline.state, PrinterState::Offline);
        assert!(!offline.online);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("TONER LOW", StatusFamily::Spooler).state, PrinterState::TonerLow);
        assert_eq!(classify("IDLE", StatusFamily::Cups).state, PrinterState::Ready);
    }
}
