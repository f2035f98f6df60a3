use std::time::Duration;

use anyhow::{Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use mailscout::{NameInput, ScoutConfig, Throttle, configure};

#[derive(Parser)]
#[command(
    name = "mailscout-cli",
    version,
    about = "découvre une adresse e-mail valide par sondage SMTP (aucun message envoyé)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    #[command(flatten)]
    pub scout: ScoutArgs,

    /// format: human|json|ndjson|csv
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// écrit le rapport dans un fichier (écriture atomique)
    #[arg(long, global = true)]
    pub out: Option<String>,

    /// verbosité des journaux sur stderr (-v, -vv, -vvv); RUST_LOG prend le pas
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// sonde une adresse précise
    Probe {
        /// adresse e-mail à tester
        email: String,
    },
    /// cherche la première adresse valide d'un domaine
    Find {
        domain: String,
        /// nom complet d'une personne (répétable, une personne par option)
        #[arg(long = "name")]
        names: Vec<String>,
    },
    /// traite une liste de domaines (fichier ou stdin)
    Bulk {
        /// fichier d'entrée: lignes `domaine[,Prénom Nom[;Autre Personne]]` ou tableau JSON
        #[arg(long)]
        input: Option<String>,
    },
}

#[derive(Args)]
pub struct ScoutArgs {
    /// désactive les variantes de nom
    #[arg(long, global = true)]
    pub no_variants: bool,

    /// désactive les préfixes génériques (info@, contact@...)
    #[arg(long, global = true)]
    pub no_prefixes: bool,

    /// désactive la détection catch-all
    #[arg(long = "no-catchall", global = true)]
    pub no_catch_all: bool,

    /// conserve les noms tels quels (pas de translittération)
    #[arg(long, global = true)]
    pub no_normalize: bool,

    /// sondes simultanées par domaine
    #[arg(long, global = true, default_value_t = 5)]
    pub threads: usize,

    /// domaines traités simultanément en mode bulk
    #[arg(long, global = true, default_value_t = 3)]
    pub bulk_threads: usize,

    /// timeout SMTP par connexion et par commande (secondes)
    #[arg(long, global = true, default_value_t = 2.0)]
    pub timeout: f64,

    /// timeout de résolution MX (secondes)
    #[arg(long, global = true, default_value_t = 5.0)]
    pub dns_timeout: f64,

    /// port SMTP
    #[arg(long, global = true, default_value_t = 25)]
    pub port: u16,

    /// nom annoncé avec EHLO
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM (vide = chemin nul `<>`)
    #[arg(long = "from", global = true)]
    pub mail_from: Option<String>,

    /// sondes démarrées par seconde et par domaine (0 = illimité)
    #[arg(long, global = true, default_value_t = 1.0)]
    pub rate: f64,

    /// sondes pouvant démarrer d'affilée avant limitation
    #[arg(long, global = true, default_value_t = 5)]
    pub burst: u32,
}

impl ScoutArgs {
    pub fn to_config(&self) -> Result<ScoutConfig> {
        let mut config = configure(
            !self.no_variants,
            !self.no_prefixes,
            !self.no_catch_all,
            !self.no_normalize,
            self.threads,
            self.bulk_threads,
            self.timeout,
        )?;
        config.dns_timeout = match Duration::try_from_secs_f64(self.dns_timeout) {
            Ok(timeout) if !timeout.is_zero() => timeout,
            _ => bail!("--dns-timeout doit être un nombre positif, reçu {}", self.dns_timeout),
        };
        config.smtp.port = self.port;
        if let Some(helo) = &self.helo {
            config.smtp.helo_domain = helo.clone();
        }
        if let Some(from) = &self.mail_from {
            config.smtp.mail_from = from.clone();
        }
        config.throttle = Throttle {
            per_second: self.rate,
            burst: self.burst,
        };
        config.validate()?;
        Ok(config)
    }
}

/// One `--name` is one person; several give one token list each.
pub fn names_input(names: &[String]) -> NameInput {
    match names {
        [] => NameInput::default(),
        [single] => NameInput::Full(single.clone()),
        many => NameInput::People(
            many.iter()
                .map(|name| name.split_whitespace().map(str::to_string).collect())
                .collect(),
        ),
    }
}
