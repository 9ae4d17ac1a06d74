use replykit_core::config::loader::{default_config_path, ConfigLoader};
use replykit_core::templates::TemplateRepository;
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    let repo = ConfigLoader::load(config, profile)
        .map_err(|e| {
            let hint = config
                .is_none()
                .then(|| format!("looked for: {}", default_config_path().display()));
            (e.to_string(), hint)
        })
        .and_then(|rc| {
            TemplateRepository::new(&rc.templates_dir).map_err(|e| (e.to_string(), None))
        });

    let repo = match repo {
        Ok(repo) => repo,
        Err((msg, hint)) => {
            println!("FAIL rk list-templates");
            println!("{msg}");
            if let Some(hint) = hint {
                println!("{hint}");
            }
            std::process::exit(1);
        }
    };

    let templates = repo.list_all();
    if templates.is_empty() {
        println!("(no templates found in {})", repo.root().display());
        return;
    }
    for t in templates {
        println!("{}", t.logical_name);
    }
    println!("-- {} templates --", templates.len());
}
