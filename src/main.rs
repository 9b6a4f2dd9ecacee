//! # Platen CLI
//!
//! Usage:
//!   platen request.json -o report.pdf
//!   echo '{ ... }' | platen -o report.pdf
//!   platen --example > request.json
//!   platen request.json -o report.pdf --debug

use std::env;
use std::fs;
use std::io::{self, Read};

use platen::error::PlatenError;
use platen::model::RenderRequest;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    let debug = args.iter().any(|a| a == "--debug");

    let request: RenderRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("✗ {}", PlatenError::from(e));
            std::process::exit(1);
        }
    };

    // Render
    match platen::render_with_report(&request) {
        Ok((pdf_bytes, report)) => {
            fs::write(&output_path, &pdf_bytes).expect("Failed to write PDF");
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
            if debug {
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&report).expect("report serializes")
                );
            }
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_report_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Development Report: Jordan Reyes",
    "author": "Coach Desk"
  },
  "payload": {
    "identity": {
      "fullName": "Jordan Reyes",
      "dateLabel": "March 2026"
    },
    "bands": { "Openness": 7, "Resilience": 9, "Drive": 6 },
    "spiderChartUrl": "",
    "text": {
      "exec_summary": "Jordan leads with curiosity and recovers quickly from setbacks. The profile shows a strong bias toward action and a genuine appetite for feedback.\n\nUnder sustained pressure the pace can outrun the team, and decisions start to concentrate. The work this quarter is widening the circle before committing.",
      "exec_summary_q1": "Which decision this month most needed another voice?",
      "exec_summary_q2": "Where did speed cost you context?",
      "exec_summary_q3": "What would slowing down 10% make possible?",
      "exec_summary_q4": "Who gives you the most honest signal today?",
      "ctrl_overview": "High resilience pairs with moderate drive in this profile. Setbacks are metabolised fast, sometimes before their lesson lands. Colleagues read the quick recovery as confidence, and occasionally as not listening.",
      "ctrl_overview_q1": "Which setback deserved a longer look?",
      "ctrl_overview_q2": "What does your recovery speed hide from others?",
      "ctrl_deepdive": "The deep dive points at control under ambiguity. When the brief is unclear, Jordan narrows scope early and defends the narrowed version. That instinct protects delivery and quietly discards options.",
      "ctrl_deepdive_q1": "When did narrowing early serve you last month?",
      "ctrl_deepdive_q2": "Which discarded option still bothers you?",
      "themes": "Two themes recur across instruments: speed as identity, and feedback as transaction. Both served earlier roles well. Both need renegotiating at this level.",
      "themes_q1": "Which theme shows up at home too?",
      "themes_q2": "What would you lose by changing it?",
      "adapt_with_colleagues": "With colleagues, narrate your thinking before the conclusion. Invite one challenge explicitly and let it land before responding.",
      "adapt_with_leaders": "With leaders, name the risk you are absorbing. Ask for the constraint you are guessing at instead of working around it.",
      "adapt_with_colleagues_q1": "Who saw your reasoning this week, not just your answer?",
      "adapt_with_leaders_q2": "Which absorbed risk stayed unspoken?",
      "actions1": "Book a monthly decision review with one peer outside the team.",
      "actions2": "Delegate one recurring call entirely, including the mistakes.",
      "actions3": "Write the risk register entry yourself before the next steering meeting."
    }
  },
  "overrides": [
    {
      "label": "coach-edits",
      "pairs": {
        "L_p1_fullName_size": 28,
        "L_p3_execP1_maxLines": 12
      },
      "table": {
        "p6Q": { "workwith_leaders_q": { "y": 1036 } }
      }
    }
  ]
}"##
}
