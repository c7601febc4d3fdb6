use std::{cell::RefCell, rc::Rc, time::Duration};

use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use vhq_client::TaskSlot;
use vhq_client::gate::{AdSession, GateAction};
use vhq_client::platform::KnownPlatform;
use vhq_client::poller::PollOutcome;
use vhq_client::session::smart::{self, AdFlow};
use vhq_client::session::SmartAction;
use vhq_client::toast::ToastKind;
use vhq_client::view::{ResultsView, Section, SelectionView, render_smart};

use crate::components::ad::AdModal;
use crate::components::paywall::Paywall;
use crate::components::progress::ProgressPanel;
use crate::components::quality::QualityCards;
use crate::components::section::{ErrorPanel, Loading};
use crate::components::toasts::Toasts;
use crate::context::{ApiContext, use_api};
use crate::state::SmartState;
use crate::timers::SleepTicker;

/// Delay between a paste into the URL input and the detection it triggers
const PASTE_DELAY: Duration = Duration::from_millis(100);

fn hint_class(hint: Option<KnownPlatform>) -> Option<&'static str> {
    match hint? {
        KnownPlatform::TikTok => Some("tiktok"),
        KnownPlatform::YouTube => Some("youtube"),
        KnownPlatform::Instagram => Some("instagram"),
        KnownPlatform::Twitter | KnownPlatform::Facebook => None,
    }
}

/// Starts the asynchronous flows of the page. The job poller and the ad countdown each own a
/// slot: starting a new one stops the previous one, and leaving the page stops both.
#[derive(Clone)]
struct Flows {
    api: ApiContext,
    dispatcher: UseReducerDispatcher<SmartState>,
    jobs: Rc<RefCell<TaskSlot>>,
    ads: Rc<RefCell<TaskSlot>>,
}

impl Flows {
    fn emit(&self) -> impl FnMut(SmartAction) + 'static {
        let dispatcher = self.dispatcher.clone();
        move |action| dispatcher.dispatch(action)
    }

    fn detect(&self, input: String) {
        let this = self.clone();
        spawn_local(async move {
            smart::detect(&this.api.client, &input, this.emit()).await;
        });
    }

    fn start_job(&self, url: String, quality: String) {
        self.ads.borrow_mut().cancel();
        let token = self.jobs.borrow_mut().start();
        let this = self.clone();
        spawn_local(async move {
            let mut ticker = SleepTicker::new(this.api.config.poll_interval);
            let outcome = smart::process(
                &this.api.client,
                &mut ticker,
                &token,
                &url,
                &quality,
                this.emit(),
            )
            .await;
            if let PollOutcome::AdRequired { .. } = outcome {
                this.start_ad(url, quality);
            }
        });
    }

    fn start_ad(&self, url: String, quality: String) {
        let token = self.ads.borrow_mut().start();
        let this = self.clone();
        spawn_local(async move {
            let mut ticker = SleepTicker::new(this.api.config.ad_tick);
            let flow =
                smart::open_ad(&this.api.client, &mut ticker, &token, &quality, this.emit()).await;
            if flow == AdFlow::Proceed {
                this.start_job(url, quality);
            }
        });
    }

    fn complete_ad(&self, url: String, session: AdSession) {
        // The countdown is over: the slot now tracks the completion, which closing the modal
        // cancels.
        let token = self.ads.borrow_mut().start();
        let this = self.clone();
        spawn_local(async move {
            if smart::finish_ad(&this.api.client, &token, &session, this.emit()).await {
                this.start_job(url, session.quality.clone());
            }
        });
    }

    fn close_ad(&self) {
        self.ads.borrow_mut().cancel();
        self.dispatcher.dispatch(SmartAction::CloseAd);
    }
}

#[derive(Properties, PartialEq)]
struct SelectionPanelProps {
    selection: SelectionView,
    on_select: Callback<String>,
    on_process: Callback<MouseEvent>,
}

#[function_component(SelectionPanel)]
fn selection_panel(
    SelectionPanelProps {
        selection,
        on_select,
        on_process,
    }: &SelectionPanelProps,
) -> Html {
    html! {
        <div class="section quality-section">
            <div class="platform-info">
                <span class="platform-icon">{ &selection.icon }</span>
                <div>
                    <strong>{ &selection.headline }</strong>
                    <div class="muted">
                        { format!("Confidence: {}%", selection.confidence) }
                        if selection.summary.is_none() {
                            { " • Analyzing video..." }
                        }
                    </div>
                </div>
            </div>
            if let Some(summary) = &selection.summary {
                <div class="video-analysis">
                    <strong>{ &summary.title }</strong>
                    <div class="muted">
                        { format!("Duration: {} • Enhancement potential: {}", summary.duration, summary.enhancement) }
                    </div>
                    <div class="enhancement-note">
                        { format!("✨ AI Enhancement available: {}", summary.gain) }
                    </div>
                </div>
            }
            <QualityCards cards={selection.cards.clone()} on_select={on_select.clone()} />
            <button class="btn-primary process-btn" disabled={!selection.process_enabled} onclick={on_process.clone()}>
                { selection.process_label.clone().unwrap_or_else(|| "Select a quality".to_string()) }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ResultsPanelProps {
    results: ResultsView,
    on_download: Callback<MouseEvent>,
}

#[function_component(ResultsPanel)]
fn results_panel(
    ResultsPanelProps {
        results,
        on_download,
    }: &ResultsPanelProps,
) -> Html {
    html! {
        <div class="section results-section">
            <h2>{ "Enhancement complete" }</h2>
            <div class="comparison">
                <div class="stats original">
                    <strong>{ &results.original_size }</strong><br />
                    <small>{ "Original quality" }</small>
                </div>
                <div class="stats enhanced">
                    <strong>{ &results.enhanced_size }</strong><br />
                    <small>{ &results.improvement }</small>
                    if let Some(ratio) = &results.ratio {
                        <div class="ratio">{ format!("✨ {ratio}") }</div>
                    }
                </div>
            </div>
            <a
                href={results.download_url.clone()}
                download={results.filename.clone().unwrap_or_default()}
                class="btn-primary no-underline"
                onclick={on_download.clone()}
            >
                <i class="fas fa-download"></i>{ " Download enhanced video" }
            </a>
        </div>
    }
}

#[function_component(SmartPage)]
pub fn smart_page() -> Html {
    let api = use_api();
    let state = use_reducer(SmartState::default);
    let input = use_node_ref();
    let jobs = use_mut_ref(TaskSlot::default);
    let ads = use_mut_ref(TaskSlot::default);
    let view = render_smart(&state.0);

    // Running flows keep the slots alive, so leaving the page cancels them explicitly.
    {
        let jobs = jobs.clone();
        let ads = ads.clone();
        use_effect_with((), move |_| {
            move || {
                jobs.borrow_mut().cancel();
                ads.borrow_mut().cancel();
            }
        });
    }

    let flows = Flows {
        api: api.clone(),
        dispatcher: state.dispatcher(),
        jobs,
        ads,
    };

    let read_input = {
        let input = input.clone();
        move || {
            input
                .cast::<HtmlInputElement>()
                .map(|i| i.value())
                .unwrap_or_default()
        }
    };

    let on_input = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            dispatcher.dispatch(SmartAction::Input(input.value()));
        })
    };

    let on_paste = {
        let flows = flows.clone();
        let read_input = read_input.clone();
        let detecting = state.0.detecting;
        Callback::from(move |_: Event| {
            if detecting {
                return;
            }
            let flows = flows.clone();
            let read_input = read_input.clone();
            spawn_local(async move {
                gloo_timers::future::sleep(PASTE_DELAY).await;
                flows.detect(read_input());
            });
        })
    };

    let on_detect = {
        let flows = flows.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            flows.detect(read_input());
        })
    };

    let on_select = {
        let dispatcher = state.dispatcher();
        Callback::from(move |quality: String| {
            dispatcher.dispatch(SmartAction::SelectQuality(quality))
        })
    };

    let on_process = {
        let flows = flows.clone();
        let session = state.0.clone();
        Callback::from(move |_: MouseEvent| {
            let url = session.url.clone();
            let quality = session.selected.clone().unwrap_or_default();
            match session.next_step() {
                Ok(GateAction::StartJob) => flows.start_job(url, quality),
                Ok(GateAction::OpenAd { .. }) => flows.start_ad(url, quality),
                Ok(GateAction::ShowPaywall) => flows
                    .dispatcher
                    .dispatch(SmartAction::ShowPaywall(Default::default())),
                Err(e) => flows
                    .dispatcher
                    .dispatch(SmartAction::Toast(ToastKind::Error, e.to_string())),
            }
        })
    };

    let on_complete_ad = {
        let flows = flows.clone();
        let url = state.0.url.clone();
        let session = state.0.ad.as_ref().and_then(|ad| ad.session.clone());
        Callback::from(move |_: MouseEvent| {
            if let Some(session) = session.clone() {
                flows.complete_ad(url.clone(), session);
            }
        })
    };

    let on_close_ad = {
        let flows = flows.clone();
        Callback::from(move |_: MouseEvent| flows.close_ad())
    };

    let on_close_paywall = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(SmartAction::ClosePaywall))
    };

    let on_download = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(SmartAction::DownloadTriggered))
    };

    let on_dismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: u64| dispatcher.dispatch(SmartAction::DismissToast(id)))
    };

    let section = match &view.section {
        None => html! {},
        Some(Section::Loading { message }) => html! { <Loading message={message.clone()} /> },
        Some(Section::QualitySelection(selection)) => html! {
            <SelectionPanel selection={selection.clone()} {on_select} {on_process} />
        },
        Some(Section::Progress(progress)) => html! {
            <ProgressPanel title="AI enhancement in progress" progress={progress.clone()} />
        },
        Some(Section::Results(results)) => html! {
            <ResultsPanel results={results.clone()} {on_download} />
        },
        Some(Section::Error { message }) => html! { <ErrorPanel message={message.clone()} /> },
        Some(Section::Preview(_) | Section::Complete { .. }) => html! {},
    };

    html! {
        <div class="page smart-page">
            <header class="header">
                <h1>{ "VideoHQ Pro" }</h1>
                <p>{ "AI enhanced downloads up to 8K" }</p>
            </header>
            <form class="url-form" onsubmit={on_detect}>
                <input
                    ref={input}
                    type="url"
                    class={classes!("url-input", hint_class(view.hint))}
                    placeholder="Paste a TikTok, YouTube or Instagram URL"
                    oninput={on_input}
                    onpaste={on_paste}
                />
                <button type="submit" class="btn-primary" disabled={!view.detect_enabled}>
                    if view.detect_enabled {
                        <i class="fas fa-search"></i>
                    } else {
                        <div class="loading"></div>
                    }
                </button>
            </form>
            { section }
            if let Some(ad) = &view.ad {
                <AdModal ad={ad.clone()} on_complete={on_complete_ad} on_close={on_close_ad} />
            }
            if let Some(offer) = &view.paywall {
                <Paywall offer={offer.clone()} on_close={on_close_paywall} />
            }
            <Toasts toasts={view.toasts.clone()} lifetime={api.config.toast_lifetime} {on_dismiss} />
        </div>
    }
}
