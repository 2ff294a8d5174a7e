//! Self-contained HTML report rendering.
//!
//! Produces one standalone document (inline CSS and JS, no external assets):
//! global stat boxes, one collapsible section per grammatical category, and
//! per-lemma cluster excerpts with member occurrences highlighted. Ellipsis
//! markers appear only where text was actually cut.

use std::fmt::Write as _;

use crate::analysis::AnalysisReport;
use crate::analysis::reports::{ClusterReport, LemmaReport, OccurrenceReport};

/// Clusters shown per lemma before the show-more control.
const VISIBLE_CLUSTERS: usize = 3;
/// Loose occurrences shown per lemma before the show-more control.
const VISIBLE_LOOSE: usize = 5;

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable label for a category code.
fn category_label(category: &str) -> &str {
    match category {
        "NOM" => "Noms",
        "VER" => "Verbes",
        "ADV" => "Adverbes",
        "ADJ" => "Adjectifs",
        "AUX" => "Auxiliaires",
        "NUM" => "Nombres",
        "ADJ:ind" => "Adjectifs indéfinis",
        "ADJ:int" => "Adjectifs interrogatifs",
        "ONO" => "Onomatopées",
        "PRO:ind" => "Pronoms indéfinis",
        "NOM_PROPRE" => "Noms propres",
        "ACRONYME" => "Acronymes",
        "ETRANGER" => "Mots étrangers",
        "INCONNU" => "Inconnus",
        other => other,
    }
}

/// Render the full report as one HTML document.
#[tracing::instrument(skip_all, fields(title))]
pub fn render_html(report: &AnalysisReport, title: &str) -> String {
    let mut html = String::with_capacity(64 * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Rapport de Répétitions - {title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Rapport de Répétitions</h1>
            <p>{title}</p>
        </div>
        <div class="stats-grid">
            <div class="stat-box"><div class="stat-number">{words}</div><div class="stat-label">Mots Totaux</div></div>
            <div class="stat-box"><div class="stat-number">{forms}</div><div class="stat-label">Mots Uniques</div></div>
            <div class="stat-box"><div class="stat-number">{lemmas}</div><div class="stat-label">Lemmes Uniques</div></div>
            <div class="stat-box"><div class="stat-number">{clusters}</div><div class="stat-label">Groupes</div></div>
        </div>
        <div class="content">
"#,
        title = escape(title),
        css = CSS,
        words = report.stats.total_words,
        forms = report.stats.unique_forms,
        lemmas = report.stats.unique_lemmas,
        clusters = report.stats.total_clusters,
    );

    for section in &report.categories {
        let _ = write!(
            html,
            r#"            <div class="category-section">
                <div class="category-header">
                    <div>
                        <span class="category-title">{name}</span>
                        <span class="info-text"> · {lemmas} lemme(s) · {occurrences} occurrences</span>
                    </div>
                    <span class="arrow">▶</span>
                </div>
                <div class="category-content">
"#,
            name = escape(category_label(&section.category)),
            lemmas = section.lemmas.len(),
            occurrences = section.total_occurrences,
        );

        for lemma in &section.lemmas {
            render_lemma(&mut html, lemma);
        }

        html.push_str("                </div>\n            </div>\n");
    }

    html.push_str("        </div>\n    </div>\n    <script>");
    html.push_str(JS);
    html.push_str("</script>\n</body>\n</html>\n");

    html
}

fn render_lemma(html: &mut String, lemma: &LemmaReport) {
    let cluster_badge = if lemma.clusters.is_empty() {
        r#"<span class="no-cluster-badge">0 groupe</span>"#.to_string()
    } else {
        format!(
            r#"<span class="cluster-badge">{} groupe(s)</span>"#,
            lemma.clusters.len()
        )
    };

    let _ = write!(
        html,
        r#"                    <div class="lemma-item">
                        <div class="lemma-header">
                            <div>
                                <span class="lemma-name">{display}</span>
                                <span class="info-text"> · {form_count} forme(s)</span>
                            </div>
                            <div>
                                <span class="lemma-count">{count}×</span>
                                {cluster_badge}
                                <span class="lemma-arrow">▶</span>
                            </div>
                        </div>
                        <div class="forms-content">
                            <div class="forms-list">
"#,
        display = escape(&lemma.display),
        form_count = lemma.forms.len(),
        count = lemma.count,
    );

    for form in &lemma.forms {
        let _ = writeln!(
            html,
            r#"                                <span class="form-tag">{}</span>"#,
            escape(form)
        );
    }
    html.push_str("                            </div>\n");

    if !lemma.clusters.is_empty() {
        let _ = write!(
            html,
            r#"                            <div class="clusters-in-lemma">
                                <div class="clusters-in-lemma-title">Groupes de répétitions
                                    <span class="cluster-count-badge">{}</span>
                                </div>
"#,
            lemma.clusters.len()
        );
        for (i, cluster) in lemma.clusters.iter().enumerate() {
            render_cluster(html, lemma, cluster, i);
        }
        if lemma.clusters.len() > VISIBLE_CLUSTERS {
            let _ = write!(
                html,
                r#"                                <button class="show-more-btn" data-target="{target}">Afficher tous les groupes ({more} de plus)</button>
"#,
                target = escape(&lemma.lemma),
                more = lemma.clusters.len() - VISIBLE_CLUSTERS,
            );
        }
        html.push_str("                            </div>\n");
    }

    if !lemma.loose_occurrences.is_empty() {
        let title = if lemma.clusters.is_empty() {
            "Occurrences dans le texte"
        } else {
            "Occurrences hors groupes"
        };
        let _ = write!(
            html,
            r#"                            <div class="clusters-in-lemma">
                                <div class="clusters-in-lemma-title">{title}
                                    <span class="cluster-count-badge">{}</span>
                                </div>
"#,
            lemma.loose_occurrences.len()
        );
        for (i, occurrence) in lemma.loose_occurrences.iter().enumerate() {
            render_loose(html, lemma, occurrence, i);
        }
        if lemma.loose_occurrences.len() > VISIBLE_LOOSE {
            let _ = write!(
                html,
                r#"                                <button class="show-more-btn" data-target="{target}-single">Afficher toutes les occurrences ({more} de plus)</button>
"#,
                target = escape(&lemma.lemma),
                more = lemma.loose_occurrences.len() - VISIBLE_LOOSE,
            );
        }
        html.push_str("                            </div>\n");
    }

    html.push_str("                        </div>\n                    </div>\n");
}

fn render_cluster(html: &mut String, lemma: &LemmaReport, cluster: &ClusterReport, index: usize) {
    let hidden = if index >= VISIBLE_CLUSTERS {
        " hidden"
    } else {
        ""
    };

    let mut body = String::new();
    for segment in &cluster.segments {
        if segment.highlight {
            let _ = write!(
                body,
                r#"<span class="highlight">{}</span>"#,
                escape(&segment.text)
            );
        } else {
            body.push_str(&escape(&segment.text));
        }
    }

    let _ = write!(
        html,
        r#"                                <div class="cluster-item{hidden}" data-lemma="{lemma}">
                                    <div class="cluster-header">Groupe {number} • {count} occurrence(s) • Position {start}-{end}</div>
                                    <div class="cluster-text"><span class="cluster-context">{open}{before}</span>{body}<span class="cluster-context">{after}{close}</span></div>
                                </div>
"#,
        lemma = escape(&lemma.lemma),
        number = index + 1,
        count = cluster.occurrence_count,
        start = cluster.body_start,
        end = cluster.body_end,
        open = if cluster.truncated_before { "…" } else { "" },
        before = escape(&cluster.before),
        after = escape(&cluster.after),
        close = if cluster.truncated_after { "…" } else { "" },
    );
}

fn render_loose(
    html: &mut String,
    lemma: &LemmaReport,
    occurrence: &OccurrenceReport,
    index: usize,
) {
    let hidden = if index >= VISIBLE_LOOSE { " hidden" } else { "" };
    let _ = write!(
        html,
        r#"                                <div class="cluster-item{hidden}" data-lemma="{lemma}-single">
                                    <div class="cluster-header">Occurrence {number} • Position {start}-{end}</div>
                                    <div class="cluster-text"><span class="cluster-context">{open}{before}</span><span class="highlight">{word}</span><span class="cluster-context">{after}{close}</span></div>
                                </div>
"#,
        lemma = escape(&lemma.lemma),
        number = index + 1,
        start = occurrence.start,
        end = occurrence.end,
        open = if occurrence.truncated_before { "…" } else { "" },
        before = escape(&occurrence.before),
        word = escape(&occurrence.word),
        after = escape(&occurrence.after),
        close = if occurrence.truncated_after { "…" } else { "" },
    );
}

const CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
       background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 20px; min-height: 100vh; }
.container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 15px;
             box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3); overflow: hidden; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white;
          padding: 40px; text-align: center; }
.header h1 { font-size: 2.5em; margin-bottom: 10px; }
.header p { font-size: 1.1em; opacity: 0.9; }
.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
              gap: 0; background: white; border-bottom: 3px solid #f0f0f0; }
.stat-box { padding: 30px; text-align: center; border-right: 1px solid #f0f0f0; }
.stat-box:last-child { border-right: none; }
.stat-number { font-size: 3em; font-weight: bold;
               background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
               -webkit-background-clip: text; -webkit-text-fill-color: transparent; background-clip: text; }
.stat-label { color: #666; font-size: 0.9em; margin-top: 5px; letter-spacing: 1px; }
.content { padding: 40px; }
.category-section { margin-bottom: 20px; border: 1px solid #e0e0e0; border-radius: 10px; overflow: hidden; }
.category-header { background: linear-gradient(to right, #f8f9fa, #ffffff); padding: 20px; cursor: pointer;
                   display: flex; justify-content: space-between; align-items: center; transition: background 0.3s; }
.category-header:hover { background: linear-gradient(to right, #e9ecef, #f8f9fa); }
.category-title { font-size: 1.3em; font-weight: bold; color: #667eea; }
.category-content { display: none; padding: 20px; background: #fafafa; }
.category-section.expanded .category-content { display: block; }
.category-section.expanded .arrow { transform: rotate(90deg); }
.arrow { transition: transform 0.3s; color: #667eea; font-size: 1.2em; margin-left: 10px; display: inline-block; }
.lemma-item { background: white; margin-bottom: 15px; border-radius: 8px; overflow: hidden;
              box-shadow: 0 2px 5px rgba(0, 0, 0, 0.05); }
.lemma-header { padding: 15px 20px; display: flex; justify-content: space-between; align-items: center;
                cursor: pointer; transition: background 0.2s; }
.lemma-header:hover { background: #f8f9fa; }
.lemma-name { font-size: 1.1em; font-weight: 600; color: #333; }
.lemma-count { background: #10b981; color: white; padding: 3px 12px; border-radius: 15px;
               font-size: 0.9em; font-weight: bold; margin-left: 8px; }
.cluster-badge { background: #d63031; color: white; padding: 3px 10px; border-radius: 15px;
                 font-size: 0.85em; font-weight: bold; margin-left: 5px; }
.no-cluster-badge { background: #95a5a6; color: white; padding: 3px 10px; border-radius: 15px;
                    font-size: 0.85em; margin-left: 5px; }
.forms-content { display: none; padding: 15px 20px; background: #f8f9fa; border-top: 1px solid #e0e0e0; }
.lemma-item.expanded .forms-content { display: block; }
.lemma-item.expanded .lemma-arrow { transform: rotate(90deg); }
.lemma-arrow { transition: transform 0.3s; color: #999; font-size: 0.9em; margin-left: 10px; display: inline-block; }
.forms-list { display: flex; flex-wrap: wrap; gap: 8px; }
.form-tag { background: white; color: #667eea; padding: 5px 12px; border-radius: 5px;
            font-size: 0.9em; border: 1px solid #667eea; }
.info-text { color: #666; font-size: 0.9em; margin-top: 5px; }
.clusters-in-lemma { margin-top: 15px; padding: 15px;
                     background: linear-gradient(135deg, #ffeaa7 0%, #fdcb6e 100%);
                     border-radius: 8px; border: 2px solid #fdcb6e; }
.clusters-in-lemma-title { font-size: 0.95em; font-weight: bold; color: #2d3436; margin-bottom: 10px;
                           display: flex; align-items: center; gap: 5px; }
.cluster-count-badge { background: #d63031; color: white; padding: 2px 8px; border-radius: 12px;
                       font-size: 0.85em; font-weight: bold; }
.cluster-item { background: white; padding: 15px; margin-bottom: 10px; border-radius: 5px;
                border-left: 4px solid #fdcb6e; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
.cluster-header { font-size: 0.9em; color: #636e72; margin-bottom: 10px; font-weight: 600; }
.cluster-text { line-height: 1.8; color: #2d3436; font-family: Georgia, serif; }
.cluster-context { color: #636e72; }
.highlight { background: #fff3cd; color: #856404; padding: 2px 4px; border-radius: 3px; font-weight: 600; }
.show-more-btn { background: #667eea; color: white; border: none; padding: 10px 20px; border-radius: 5px;
                 cursor: pointer; font-size: 1em; margin-top: 15px; transition: background 0.3s; }
.show-more-btn:hover { background: #764ba2; }
.hidden { display: none !important; }
"#;

const JS: &str = r#"
document.addEventListener('DOMContentLoaded', function() {
    document.querySelectorAll('.category-header').forEach(function(header) {
        header.addEventListener('click', function() {
            this.closest('.category-section').classList.toggle('expanded');
        });
    });
    document.querySelectorAll('.lemma-header').forEach(function(header) {
        header.addEventListener('click', function() {
            this.closest('.lemma-item').classList.toggle('expanded');
        });
    });
    document.querySelectorAll('.show-more-btn').forEach(function(btn) {
        btn.addEventListener('click', function() {
            var target = this.dataset.target;
            document.querySelectorAll('.cluster-item.hidden[data-lemma="' + target + '"]')
                .forEach(function(item) { item.classList.remove('hidden'); });
            this.style.display = 'none';
        });
    });
    document.addEventListener('keydown', function(e) {
        if (e.key === 'o' && e.ctrlKey) {
            e.preventDefault();
            document.querySelectorAll('.category-section').forEach(function(s) { s.classList.add('expanded'); });
        }
        if (e.key === 'c' && e.ctrlKey) {
            e.preventDefault();
            document.querySelectorAll('.category-section').forEach(function(s) { s.classList.remove('expanded'); });
            document.querySelectorAll('.lemma-item').forEach(function(s) { s.classList.remove('expanded'); });
        }
    });
});
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisParams, run_analysis};
    use crate::lexicon::{Lexicon, entry};

    fn sample_report() -> AnalysisReport {
        let lexicon = Lexicon::from_entries([
            entry("chat", "chat", "NOM", 26.0, true),
            entry("dort", "dormir", "VER", 249.0, false),
            entry("dormir", "dormir", "VER", 249.0, true),
        ]);
        let text = "Le chat dort. Le chat ronronne. Le chat rêve.";
        run_analysis(text, &lexicon, &AnalysisParams::default()).unwrap()
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<b>"l'été" & fin</b>"#),
            "&lt;b&gt;&quot;l&#39;été&quot; &amp; fin&lt;/b&gt;"
        );
        assert_eq!(escape("chat"), "chat");
    }

    #[test]
    fn document_is_complete_and_titled() {
        let html = render_html(&sample_report(), "essai.txt");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Rapport de Répétitions - essai.txt"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn occurrences_are_highlighted() {
        let html = render_html(&sample_report(), "essai.txt");
        assert!(html.contains(r#"<span class="highlight">chat</span>"#));
        assert!(html.contains("3 occurrence(s)"));
    }

    #[test]
    fn title_is_escaped() {
        let html = render_html(&sample_report(), "<script>.txt");
        assert!(!html.contains("<script>.txt"));
        assert!(html.contains("&lt;script&gt;.txt"));
    }

    #[test]
    fn no_ellipsis_when_nothing_was_cut() {
        // The cluster spans nearly the whole text; context reaches both
        // boundaries, so no ellipsis should be emitted around it.
        let html = render_html(&sample_report(), "essai.txt");
        assert!(!html.contains('…'));
    }

    #[test]
    fn ellipsis_marks_actual_cuts() {
        let lexicon = Lexicon::from_entries([entry("chat", "chat", "NOM", 26.0, true)]);
        let filler = "mot ".repeat(60);
        let text = format!("{filler}chat et chat{filler}");
        let report = run_analysis(&text, &lexicon, &AnalysisParams::default()).unwrap();
        let html = render_html(&report, "essai.txt");
        assert!(html.contains('…'));
    }

    #[test]
    fn category_labels_are_humanized() {
        let html = render_html(&sample_report(), "essai.txt");
        assert!(html.contains("Noms"));
        assert!(html.contains("Verbes") || !html.contains(">VER<"));
    }
}
