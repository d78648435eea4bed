//! Mint page HTML
//!
//! Self-contained HTML/JS page. Besides rendering the mint card and the
//! gallery it relays between the server and the page's injected wallet.

/// Generate the mint page HTML
///
/// The page will:
/// 1. Announce itself on /bridge/hello (provider present, mobile, host)
/// 2. Forward `chainChanged` / `accountsChanged` to /bridge/event
/// 3. Long-poll /bridge/poll and run each request on `window.ethereum`
/// 4. POST each result or error to /bridge/reply/{id}
/// 5. Render /api/state and send button presses to /api/*
pub fn generate_mint_page(title: &str, poll_timeout_ms: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title_html}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #0f172a 0%, #1e1b4b 100%);
            min-height: 100vh;
            color: #fff;
            padding: 32px 16px;
        }}
        .layout {{ max-width: 960px; margin: 0 auto; display: grid; gap: 24px; }}
        .card {{
            background: rgba(255,255,255,0.05);
            border-radius: 16px;
            padding: 32px;
            border: 1px solid rgba(255,255,255,0.1);
        }}
        h1 {{ font-size: 24px; margin-bottom: 8px; }}
        .muted {{ color: rgba(255,255,255,0.6); font-size: 14px; }}
        .row {{ display: flex; align-items: center; justify-content: space-between; gap: 12px; margin-top: 16px; }}
        select, button {{
            font-size: 16px; border-radius: 8px; border: none; padding: 10px 16px;
        }}
        select {{ background: rgba(0,0,0,0.3); color: #fff; }}
        button {{ background: #6366f1; color: #fff; cursor: pointer; transition: background 0.2s; }}
        button:hover:not(:disabled) {{ background: #4f46e5; }}
        button:disabled {{ opacity: 0.5; cursor: not-allowed; }}
        .stepper {{ display: flex; align-items: center; gap: 12px; }}
        .stepper span {{ min-width: 32px; text-align: center; font-size: 20px; }}
        #action {{ width: 100%; margin-top: 24px; padding: 14px; }}
        .status {{ padding: 12px; border-radius: 8px; margin-top: 16px; font-size: 14px; word-break: break-all; }}
        .status.error {{ background: rgba(239, 68, 68, 0.2); border: 1px solid rgba(239, 68, 68, 0.3); }}
        .status.success {{ background: rgba(34, 197, 94, 0.2); border: 1px solid rgba(34, 197, 94, 0.3); }}
        .media {{
            height: 400px; background: rgba(0,0,0,0.3); border-radius: 12px;
            display: flex; align-items: center; justify-content: center; overflow: hidden; margin-top: 16px;
        }}
        .media img, .media video {{ max-width: 100%; max-height: 100%; object-fit: contain; }}
        a {{ color: #818cf8; }}
        .links {{ display: flex; flex-direction: column; gap: 8px; margin-top: 16px; }}
        .hidden {{ display: none; }}
    </style>
</head>
<body>
    <div class="layout">
        <div class="card">
            <h1>{title_html}</h1>
            <p class="muted" id="wallet">Wallet not connected</p>
            <div class="row">
                <label for="network">Network</label>
                <select id="network"></select>
            </div>
            <div class="row">
                <span>Quantity</span>
                <div class="stepper">
                    <button id="dec">-</button>
                    <span id="quantity">1</span>
                    <button id="inc">+</button>
                </div>
            </div>
            <div class="row">
                <span>Total</span>
                <span id="total">0.05 ETH</span>
            </div>
            <button id="action">Connect Wallet</button>
            <div id="error" class="status error hidden"></div>
            <div id="tx" class="status success hidden"></div>
            <div class="links" id="links"></div>
        </div>
        <div class="card">
            <h1>See it all. All at once. Ancient Coins That Still Speak.</h1>
            <div class="media" id="media"></div>
            <div class="row">
                <button id="prev">&larr; Go Back</button>
                <span class="muted" id="media-title"></span>
                <button id="next">Next &rarr;</button>
            </div>
        </div>
    </div>
    <script>
        const POLL_TIMEOUT_MS = {poll_timeout_ms};
        const $ = (id) => document.getElementById(id);
        const sleep = (ms) => new Promise(r => setTimeout(r, ms));

        async function post(path, body) {{
            const response = await fetch(path, {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify(body || {{}})
            }});
            if (!response.ok || response.status === 204) return null;
            const text = await response.text();
            return text ? JSON.parse(text) : null;
        }}

        // Wallet relay

        async function runRequest(req) {{
            let reply;
            try {{
                if (!window.ethereum) throw {{ code: 4900, message: 'No injected wallet' }};
                const result = await window.ethereum.request({{ method: req.method, params: req.params }});
                reply = {{ result: result === undefined ? null : result }};
            }} catch (err) {{
                reply = {{ error: {{
                    code: typeof err.code === 'number' ? err.code : -32603,
                    message: err.message || String(err),
                    data: err.data === undefined ? null : err.data
                }} }};
            }}
            await post('/bridge/reply/' + encodeURIComponent(req.id), reply);
            refresh();
        }}

        async function pollLoop() {{
            for (;;) {{
                const abort = new AbortController();
                const timer = setTimeout(() => abort.abort(), POLL_TIMEOUT_MS + 5000);
                try {{
                    const response = await fetch('/bridge/poll', {{ signal: abort.signal }});
                    if (!response.ok) {{ await sleep(1000); continue; }}
                    const requests = await response.json();
                    requests.forEach(runRequest);
                }} catch (e) {{
                    await sleep(1000);
                }} finally {{
                    clearTimeout(timer);
                }}
            }}
        }}

        async function startBridge() {{
            if (window.ethereum && window.ethereum.on) {{
                window.ethereum.on('chainChanged', (chainId) =>
                    post('/bridge/event', {{ event: 'chainChanged', payload: chainId }}).then(refresh));
                window.ethereum.on('accountsChanged', (accounts) =>
                    post('/bridge/event', {{ event: 'accountsChanged', payload: accounts }}).then(refresh));
            }}
            await post('/bridge/hello', {{
                provider_present: !!window.ethereum,
                mobile: /android|iphone|ipad|ipod/i.test(navigator.userAgent),
                host: window.location.host
            }});
            pollLoop();
        }}

        // Mint card

        function render(view) {{
            if (!view) return;
            if (view.redirect) {{ window.location.href = view.redirect; return; }}

            $('wallet').textContent = view.account_short
                ? 'Connected: ' + view.account_short + (view.wallet_network ? ' on ' + view.wallet_network : '')
                : 'Wallet not connected';

            const select = $('network');
            select.innerHTML = '';
            view.networks.forEach(n => {{
                const option = document.createElement('option');
                option.value = n.id;
                option.textContent = n.label;
                option.selected = n.selected;
                select.appendChild(option);
            }});
            select.disabled = view.in_flight.switching || view.in_flight.minting;

            const stepperBusy = view.in_flight.switching || view.in_flight.minting;
            $('quantity').textContent = view.quantity;
            $('dec').disabled = stepperBusy || !view.can_decrement;
            $('inc').disabled = stepperBusy || !view.can_increment;
            $('total').textContent = view.total_cost + ' ' + view.currency_symbol;

            const action = $('action');
            action.textContent = view.action_label;
            action.disabled = !view.action_enabled;
            action.dataset.action = view.action;

            const error = $('error');
            error.textContent = view.error ? view.error.message : '';
            error.classList.toggle('hidden', !view.error);

            const tx = $('tx');
            tx.innerHTML = '';
            if (view.tx) {{
                tx.append('Minted ' + view.tx.quantity + ': ');
                if (view.tx.explorer_url) {{
                    const link = document.createElement('a');
                    link.href = view.tx.explorer_url;
                    link.target = '_blank';
                    link.rel = 'noopener noreferrer';
                    link.textContent = view.tx.short;
                    tx.append(link);
                }} else {{
                    tx.append(view.tx.hash);
                }}
            }}
            tx.classList.toggle('hidden', !view.tx);

            const links = $('links');
            links.innerHTML = '';
            view.networks.filter(n => n.contract_url).forEach(n => {{
                const link = document.createElement('a');
                link.href = n.contract_url;
                link.target = '_blank';
                link.rel = 'noopener noreferrer';
                link.textContent = 'View contract on ' + n.label;
                links.appendChild(link);
            }});
        }}

        async function refresh() {{
            try {{
                const response = await fetch('/api/state');
                if (response.ok) render(await response.json());
            }} catch (e) {{}}
        }}

        $('action').onclick = async () => {{
            const routes = {{ connect: 'connect', switch_network: 'switch', mint: 'mint' }};
            const pending = post('/api/' + (routes[$('action').dataset.action] || 'connect'));
            setTimeout(refresh, 100);
            render(await pending);
        }};
        $('network').onchange = async (e) => render(await post('/api/network', {{ network: e.target.value }}));
        $('dec').onclick = async () => render(await post('/api/quantity', {{ delta: -1 }}));
        $('inc').onclick = async () => render(await post('/api/quantity', {{ delta: 1 }}));

        // Gallery

        function renderMedia(view) {{
            if (!view || !view.item) return;
            const item = view.item;
            const media = $('media');
            media.innerHTML = '';
            let el;
            if (item.kind === 'video') {{
                el = document.createElement('video');
                el.controls = true;
                el.src = item.url;
            }} else if (item.kind === 'model') {{
                el = document.createElement('a');
                el.href = item.url;
                el.textContent = 'Download 3D model';
            }} else {{
                el = document.createElement('img');
                el.src = item.url;
                el.alt = item.title;
            }}
            media.appendChild(el);
            $('media-title').textContent = item.title + ' (' + (view.index + 1) + '/' + view.total + ')';
        }}

        $('prev').onclick = async () => renderMedia(await post('/api/gallery/prev'));
        $('next').onclick = async () => renderMedia(await post('/api/gallery/next'));

        (async () => {{
            await startBridge();
            await refresh();
            fetch('/api/gallery').then(r => r.json()).then(renderMedia).catch(() => {{}});
            setInterval(refresh, 2000);
        }})();
    </script>
</body>
</html>"#,
        title_html = escape_html(title),
        poll_timeout_ms = poll_timeout_ms
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wires_bridge_endpoints() {
        let html = generate_mint_page("Ancient Coins", 25_000);
        assert!(html.contains("/bridge/hello"));
        assert!(html.contains("/bridge/poll"));
        assert!(html.contains("/bridge/reply/"));
        assert!(html.contains("/bridge/event"));
        assert!(html.contains("POLL_TIMEOUT_MS = 25000"));
    }

    #[test]
    fn test_post_tolerates_empty_replies() {
        let html = generate_mint_page("Ancient Coins", 1);
        assert!(html.contains("response.status === 204"));
        assert!(!html.contains("response.ok ? response.json()"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = generate_mint_page("<script>", 1);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<title><script>"));
    }
}
