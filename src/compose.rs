use docker_compose_types::{
    Compose, ComposeVolume, DependsCondition, DependsOnOptions, Environment, Healthcheck,
    HealthcheckTest, Labels, MapOrEmpty, Ports, Service, Services, TopLevelVolumes, Volumes,
};
use indexmap::IndexMap;

use crate::config::{Mode, Settings};
use crate::envfile;

pub const APP_SERVICE: &str = "n8n";
pub const DB_SERVICE: &str = "postgres";

const APP_VOLUME: &str = "n8n_data";
const DB_VOLUME: &str = "postgres_data";

/// Render the `docker-compose.yml` for the given mode. Every
/// credential is referenced as `${KEY}` and resolved by compose
/// from the secret file next to it.
#[must_use]
pub fn render(mode: Mode, settings: &Settings) -> String {
    let mut services = IndexMap::new();
    let mut volumes = IndexMap::new();

    if mode == Mode::Dev {
        services.insert(DB_SERVICE.to_string(), Some(db_service(settings)));
        volumes.insert(DB_VOLUME.to_string(), MapOrEmpty::Map(local_volume()));
    }

    services.insert(APP_SERVICE.to_string(), Some(app_service(mode, settings)));
    volumes.insert(APP_VOLUME.to_string(), MapOrEmpty::Map(local_volume()));

    let compose = Compose {
        services: Services(services),
        volumes: TopLevelVolumes(volumes),
        ..Default::default()
    };

    serde_yaml::to_string(&compose).expect("compose model always serializes")
}

fn var(key: &str) -> String {
    format!("${{{key}}}")
}

fn db_service(settings: &Settings) -> Service {
    let environment = Environment::List(vec![
        format!("POSTGRES_USER={}", var(envfile::DB_USER)),
        format!("POSTGRES_PASSWORD={}", var(envfile::DB_PASSWORD)),
        format!("POSTGRES_DB={}", var(envfile::DB_DATABASE)),
    ]);

    let interval = format!("{}s", settings.db_healthcheck_interval.as_secs());
    let healthcheck = Healthcheck {
        test: Some(HealthcheckTest::Multiple(vec![
            "CMD-SHELL".to_string(),
            format!(
                "pg_isready -h localhost -U {} -d {}",
                var(envfile::DB_USER),
                var(envfile::DB_DATABASE)
            ),
        ])),
        interval: Some(interval.clone()),
        timeout: Some(interval),
        retries: settings.db_healthcheck_retries,
        ..Default::default()
    };

    Service {
        image: Some(settings.db_image.clone()),
        restart: Some("always".to_string()),
        environment,
        volumes: vec![Volumes::Simple(format!(
            "{DB_VOLUME}:/var/lib/postgresql/data"
        ))],
        healthcheck: Some(healthcheck),
        ..Default::default()
    }
}

fn app_service(mode: Mode, settings: &Settings) -> Service {
    let (db_host, db_port) = match mode {
        Mode::Dev => (DB_SERVICE.to_string(), "5432".to_string()),
        Mode::Live => (var(envfile::DB_HOST), var(envfile::DB_PORT)),
    };

    let environment = Environment::List(vec![
        "DB_TYPE=postgresdb".to_string(),
        format!("DB_POSTGRESDB_HOST={db_host}"),
        format!("DB_POSTGRESDB_PORT={db_port}"),
        format!("DB_POSTGRESDB_DATABASE={}", var(envfile::DB_DATABASE)),
        format!("DB_POSTGRESDB_USER={}", var(envfile::DB_USER)),
        format!("DB_POSTGRESDB_PASSWORD={}", var(envfile::DB_PASSWORD)),
        format!("N8N_HOST={}", var(envfile::N8N_HOST)),
        format!("N8N_PORT={}", settings.app_port),
        "N8N_PROTOCOL=https".to_string(),
        format!("WEBHOOK_URL={}", var(envfile::WEBHOOK_URL)),
    ]);

    let mut service = Service {
        image: Some(settings.app_image.clone()),
        restart: Some("always".to_string()),
        ports: Ports::Short(vec![format!(
            "127.0.0.1:{port}:{port}",
            port = settings.app_port
        )]),
        environment,
        volumes: vec![Volumes::Simple(format!("{APP_VOLUME}:/home/node/.n8n"))],
        ..Default::default()
    };

    if mode == Mode::Dev {
        let mut depends = IndexMap::new();
        depends.insert(DB_SERVICE.to_string(), DependsCondition::service_healthy());
        service.depends_on = DependsOnOptions::Conditional(depends);
    }

    service
}

fn local_volume() -> ComposeVolume {
    ComposeVolume {
        driver: Some("local".to_string()),
        driver_opts: IndexMap::new(),
        external: None,
        labels: Labels::default(),
        name: None,
    }
}
