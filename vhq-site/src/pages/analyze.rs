use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use vhq_api::api::download::post::OutputFormat;
use vhq_client::TaskSlot;
use vhq_client::session::{DownloadAction, SimulatedProgress, download};
use vhq_client::toast::ToastKind;
use vhq_client::view::{PreviewView, Section, render_download};

use crate::components::progress::ProgressPanel;
use crate::components::section::{ErrorPanel, Loading};
use crate::components::toasts::Toasts;
use crate::components::transcript::TranscriptModal;
use crate::context::use_api;
use crate::state::DownloadState;
use crate::timers::SleepTicker;

fn emitter(dispatcher: &UseReducerDispatcher<DownloadState>) -> impl FnMut(DownloadAction) {
    let dispatcher = dispatcher.clone();
    move |action| dispatcher.dispatch(action)
}

#[derive(Properties, PartialEq)]
struct PreviewPanelProps {
    preview: PreviewView,
    downloading: bool,
    on_quality: Callback<String>,
    on_format: Callback<OutputFormat>,
    on_download: Callback<MouseEvent>,
    on_transcript: Callback<MouseEvent>,
}

#[function_component(PreviewPanel)]
fn preview_panel(
    PreviewPanelProps {
        preview,
        downloading,
        on_quality,
        on_format,
        on_download,
        on_transcript,
    }: &PreviewPanelProps,
) -> Html {
    let onchange = {
        let on_quality = on_quality.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_quality.emit(select.value());
        })
    };
    let format_tab = |format: OutputFormat, label: &'static str, icon: &'static str| {
        let on_format = on_format.clone();
        let onclick = Callback::from(move |_: MouseEvent| on_format.emit(format));
        html! {
            <button class={classes!("format-tab", (preview.format == format).then_some("active"))} {onclick}>
                <i class={icon}></i>{ format!(" {label}") }
            </button>
        }
    };

    html! {
        <div class="section video-preview">
            <div class="preview-media">
                if let Some(thumbnail) = &preview.thumbnail {
                    <img class="thumbnail" src={thumbnail.clone()} alt="Video thumbnail" />
                }
                <div class="platform-badge" style={format!("background: {};", preview.platform.color)}>
                    <i class={preview.platform.icon}></i>
                    <span>{ preview.platform.name }</span>
                </div>
            </div>
            <div class="preview-details">
                <h3 class="video-title">
                    { &preview.title }
                    if preview.resolved_from_short_link {
                        <small class="muted">{ " (Resolved from short URL)" }</small>
                    }
                </h3>
                <div class="video-meta">
                    <span><i class="fas fa-clock"></i>{ format!(" {}", preview.duration) }</span>
                    <span><i class="fas fa-file"></i>{ format!(" {}", preview.size) }</span>
                </div>
                if let Some(warning) = &preview.warning {
                    <p class="warning">{ warning }</p>
                }
            </div>
            <div class="controls">
                <div class="format-tabs">
                    { format_tab(OutputFormat::Video, "Video", "fas fa-video") }
                    { format_tab(OutputFormat::Audio, "Audio", "fas fa-music") }
                </div>
                <select class="quality-select" {onchange}>
                    {
                        preview.qualities.iter().map(|choice| html! {
                            <option
                                value={choice.value.clone()}
                                selected={preview.quality.as_deref() == Some(choice.value.as_str())}
                            >
                                { &choice.label }
                            </option>
                        }).collect::<Html>()
                    }
                </select>
                <div class="button-group">
                    <button class="btn-primary" disabled={*downloading} onclick={on_download.clone()}>
                        if *downloading {
                            <i class="fas fa-spinner fa-spin"></i>{ " Preparing..." }
                        } else {
                            <i class="fas fa-download"></i>{ " Download Video" }
                        }
                    </button>
                    if preview.transcript_available {
                        <button class="btn-secondary" disabled={preview.transcript_loading} onclick={on_transcript.clone()}>
                            if preview.transcript_loading {
                                <i class="fas fa-spinner fa-spin"></i>{ " Loading..." }
                            } else {
                                <i class="fas fa-closed-captioning"></i>{ " Get Transcript" }
                            }
                        </button>
                    }
                </div>
            </div>
        </div>
    }
}

#[function_component(AnalyzePage)]
pub fn analyze_page() -> Html {
    let api = use_api();
    let state = use_reducer(DownloadState::default);
    let input = use_node_ref();
    let progress_slot = use_mut_ref(TaskSlot::default);
    let view = render_download(&state.0);

    let on_analyze = {
        let api = api.clone();
        let dispatcher = state.dispatcher();
        let input = input.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let value = input
                .cast::<HtmlInputElement>()
                .map(|i| i.value())
                .unwrap_or_default();
            let api = api.clone();
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                download::analyze(&api.client, &value, emitter(&dispatcher)).await;
            });
        })
    };

    let on_download = {
        let api = api.clone();
        let dispatcher = state.dispatcher();
        let slot = progress_slot.clone();
        let url = state.0.url.clone();
        let quality = state.0.quality.clone();
        let format = state.0.format;
        Callback::from(move |_: MouseEvent| {
            let Some(quality) = quality.clone() else {
                return;
            };
            let token = slot.borrow_mut().start();

            {
                let dispatcher = dispatcher.clone();
                let token = token.clone();
                let mut ticker = SleepTicker::new(api.config.progress_tick);
                let progress = SimulatedProgress::for_url(&url);
                spawn_local(async move {
                    download::run_simulated_progress(
                        &mut ticker,
                        &token,
                        progress,
                        emitter(&dispatcher),
                    )
                    .await;
                });
            }

            let api = api.clone();
            let dispatcher = dispatcher.clone();
            let url = url.clone();
            spawn_local(async move {
                download::download(&api.client, &url, &quality, format, emitter(&dispatcher))
                    .await;
                token.cancel();
            });
        })
    };

    let on_transcript = {
        let api = api.clone();
        let dispatcher = state.dispatcher();
        let url = state.0.url.clone();
        Callback::from(move |_: MouseEvent| {
            let api = api.clone();
            let dispatcher = dispatcher.clone();
            let url = url.clone();
            spawn_local(async move {
                download::load_transcript(&api.client, &url, emitter(&dispatcher)).await;
            });
        })
    };

    let on_quality = {
        let dispatcher = state.dispatcher();
        Callback::from(move |quality: String| {
            dispatcher.dispatch(DownloadAction::SelectQuality(quality))
        })
    };
    let on_format = {
        let dispatcher = state.dispatcher();
        Callback::from(move |format: OutputFormat| {
            dispatcher.dispatch(DownloadAction::SelectFormat(format))
        })
    };
    let on_retry = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(DownloadAction::Retry))
    };
    let on_close_transcript = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(DownloadAction::CloseTranscript))
    };
    let on_toast = {
        let dispatcher = state.dispatcher();
        Callback::from(move |(kind, message): (ToastKind, String)| {
            dispatcher.dispatch(DownloadAction::Toast(kind, message))
        })
    };
    let on_dismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: u64| dispatcher.dispatch(DownloadAction::DismissToast(id)))
    };

    let section = match &view.section {
        None => html! {},
        Some(Section::Loading { message }) => html! { <Loading message={message.clone()} /> },
        Some(Section::Preview(preview)) => html! {
            <PreviewPanel
                preview={preview.clone()}
                downloading={state.0.is_downloading()}
                {on_quality}
                {on_format}
                {on_download}
                {on_transcript}
            />
        },
        Some(Section::Progress(progress)) => html! {
            <ProgressPanel title="Downloading" progress={progress.clone()} />
        },
        Some(Section::Complete {
            download_url,
            filename,
        }) => html! {
            <div class="section download-complete">
                <i class="fas fa-check-circle"></i>
                <h2>{ "Your download is ready" }</h2>
                <a href={download_url.clone()} download={filename.clone()} class="btn-primary no-underline">
                    <i class="fas fa-download"></i>{ format!(" {filename}") }
                </a>
            </div>
        },
        Some(Section::Error { message }) => html! {
            <ErrorPanel message={message.clone()} on_retry={Some(on_retry)} />
        },
        Some(Section::QualitySelection(_) | Section::Results(_)) => html! {},
    };

    let title = state
        .0
        .analysis
        .as_ref()
        .and_then(|a| a.title.clone())
        .map(AttrValue::from);

    html! {
        <div class="page analyze-page">
            <header class="header">
                <h1>{ "Video Downloader" }</h1>
                <p>{ "Download videos from YouTube, TikTok, Twitter, Facebook and Instagram" }</p>
            </header>
            <form class="url-form" onsubmit={on_analyze}>
                <input ref={input} type="url" class="url-input" placeholder="Paste a video URL" />
                <button type="submit" class="btn-primary" disabled={!view.analyze_enabled}>
                    if view.analyze_enabled {
                        <i class="fas fa-search"></i>{ " Analyze" }
                    } else {
                        <i class="fas fa-spinner fa-spin"></i>{ " Analyzing..." }
                    }
                </button>
            </form>
            { section }
            if let Some(transcript) = &view.transcript {
                <TranscriptModal
                    transcript={transcript.clone()}
                    {title}
                    on_close={on_close_transcript}
                    {on_toast}
                />
            }
            <Toasts toasts={view.toasts.clone()} lifetime={api.config.toast_lifetime} {on_dismiss} />
        </div>
    }
}
