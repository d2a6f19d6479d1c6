//! Terminal runner for the onboarding flow: walks every scene against a
//! local database, mirroring what the web client does. Persistence failures
//! are logged and the flow continues (best-effort, like the original UI).

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use flow::{script, Effect, FlowController, FlowEvent, Scene, Step};
use grading::{GradingConfig, OpenAiGrader};
use server_api::ApiContext;
use shared::domain::SessionIdentity;
use storage::Storage;
use tracing::warn;

#[derive(Parser, Debug)]
struct Args {
    /// SQLite database holding people and scores.
    #[arg(long, default_value = "sqlite://./data/onboarding.db")]
    database_url: String,
    /// API key for the essay grader; without it essays grade to 1.
    #[arg(long)]
    grading_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    let args = Args::parse();

    let api_key = args
        .grading_api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());

    let storage = Storage::new(&args.database_url).await?;
    let ctx = ApiContext {
        storage,
        grader: Arc::new(OpenAiGrader::new(GradingConfig {
            api_key,
            ..GradingConfig::default()
        })),
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut controller = FlowController::new();

    loop {
        let scene = controller.scene();
        let event_input = prompt_for(scene, &controller, &mut lines)?;
        let step = match controller.transition(event_for(scene, &event_input)) {
            Ok(step) => step,
            Err(error) => {
                println!("  ({error})");
                continue;
            }
        };

        match step {
            Step::WrongAnswer { popup } => {
                println!("  Jawaban belum tepat, coba lagi!");
                tokio::time::sleep(popup).await;
            }
            Step::Moved { scene, effects } => {
                if scene == Scene::Chat && !controller.profile().email.is_empty() {
                    register(&ctx, &controller).await;
                }
                run_effects(&ctx, &controller, effects).await;
                if scene == Scene::Closing {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn prompt_for(
    scene: Scene,
    controller: &FlowController,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<String> {
    match scene {
        Scene::Welcome => println!("Selamat datang di simulasi marketing! (tekan ENTER)"),
        Scene::Registration => println!("Registrasi. Masukkan: nama,email"),
        Scene::Chat => {
            for message in script::conversation_for(&controller.profile().name) {
                println!("Ayu: {}", message.text);
                for reply in message.responses {
                    println!("  Kamu: {reply}");
                }
            }
            println!("(tekan ENTER untuk lanjut)");
        }
        Scene::MeetingCover | Scene::Meeting2Cover | Scene::Meeting3Cover => {
            println!("-- {} -- (tekan ENTER)", scene.as_str());
        }
        Scene::MeetingTransition | Scene::M2ToM3Transition => {
            println!("-- jeda pertemuan -- (tekan ENTER)");
        }
        Scene::M1Q1 => println!("Platform mana yang cocok untuk kafe visual? (instagram/facebook/tiktok)"),
        Scene::M1Q2 => println!("Produk iklan mana yang menangkap niat pencarian? (search-ads/display-ads)"),
        Scene::M1Q3 => println!("Susun iklannya: dua bagian, pisahkan dengan koma (mis. headline,description)"),
        Scene::M2Q1 => println!("Rp300.000 mendatangkan 10 pelanggan. Berapa biaya untuk 25 pelanggan?"),
        Scene::M2Q2 => println!("25 pelanggan x Rp50.000 belanja, budget Rp750.000. Berapa untungnya?"),
        Scene::M2Q3 => println!("Promosi mana yang paling efisien? (promo-a-smallest/promo-b-smallest/...)"),
        Scene::M2Q4 => println!("Jam posting terbaik? (time-1/time-2/time-3)"),
        Scene::M2Q5 => println!("Berapa persen engagement rate postingan itu?"),
        Scene::M2Q6 => println!("Konten mana yang lebih menarik? (A/B)"),
        Scene::M2Q7 => println!("Desain mana yang paling sesuai brand? (A/B/C/D)"),
        Scene::M3Q1 => println!("Refleksi pertemuan tiga. (tekan ENTER)"),
        Scene::M3Q2 => println!("Apa strategi pertama yang akan kamu sarankan untuk Ayu?"),
        Scene::M3Q3 => println!("Apa motivasimu belajar marketing?"),
        Scene::Closing => {}
    }
    print!("> ");
    io::stdout().flush()?;
    Ok(lines.next().transpose()?.unwrap_or_default())
}

fn event_for<'a>(scene: Scene, input: &'a str) -> FlowEvent<'a> {
    match scene {
        Scene::Registration => {
            let (name, email) = input.split_once(',').unwrap_or((input, ""));
            FlowEvent::SubmitProfile {
                name: name.trim(),
                email: email.trim(),
            }
        }
        Scene::M1Q1 | Scene::M1Q2 => FlowEvent::SubmitChoice(input.trim()),
        Scene::M1Q3 => {
            let (first, second) = input.split_once(',').unwrap_or((input, ""));
            FlowEvent::SubmitPair(first.trim(), second.trim())
        }
        Scene::M2Q1
        | Scene::M2Q2
        | Scene::M2Q3
        | Scene::M2Q4
        | Scene::M2Q5
        | Scene::M2Q6
        | Scene::M2Q7 => FlowEvent::SubmitScored(input.trim()),
        Scene::M3Q2 | Scene::M3Q3 => FlowEvent::SubmitText(input),
        _ => FlowEvent::Next,
    }
}

async fn register(ctx: &ApiContext, controller: &FlowController) {
    let profile = controller.profile();
    match server_api::register_person(ctx, &profile.name, &profile.email).await {
        Ok(person_id) => println!("  Terdaftar (id {})", person_id.0),
        Err(error) => warn!(?error, "registration failed, continuing without persistence"),
    }
}

/// Executes the controller's side effects best-effort: a failed write is
/// logged and the flow keeps moving, matching the original UI behavior.
async fn run_effects(ctx: &ApiContext, controller: &FlowController, effects: Vec<Effect>) {
    let profile = controller.profile();
    let identity = SessionIdentity {
        name: profile.name.clone(),
        email: profile.email.clone(),
    };

    for effect in effects {
        match effect {
            Effect::PersistMeetingTwoScore(score) => {
                if let Err(error) =
                    server_api::save_meeting_two_score(ctx, Some(&identity), score).await
                {
                    warn!(?error, score, "failed to persist meeting-two score");
                }
                println!("  Skor pertemuan dua: {score}/7");
            }
            Effect::GradeAndPersistEssay(essay) => {
                match server_api::save_essay_feedback(ctx, Some(&identity), &essay).await {
                    Ok(graded) => println!("  Esai dinilai: {graded}/3"),
                    Err(error) => warn!(?error, "failed to persist essay feedback"),
                }
            }
            Effect::PersistMotivation(text) => {
                if let Err(error) =
                    server_api::save_motivation_feedback(ctx, Some(&identity), &text).await
                {
                    warn!(?error, "failed to persist motivation answer");
                }
            }
            Effect::ResolveResult => {
                match server_api::final_result(ctx, Some(&identity)).await {
                    Ok(marketer_type) => {
                        println!("  Tipe marketermu: {}", marketer_type.label());
                        println!("  Badge: {}", marketer_type.asset_path());
                    }
                    Err(error) => warn!(?error, "failed to resolve final result"),
                }
            }
            Effect::ClearSession => {
                // No real cookies in the terminal runner; the flow just ends.
            }
        }
    }
}
